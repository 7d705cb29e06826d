pub mod auctions;
pub mod dashboard;
pub mod purchases;
pub mod rentals;
pub mod views;
