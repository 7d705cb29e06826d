use crate::model::text_enum;
use serde::{Deserialize, Serialize};

text_enum! {
    /// 위시리스트 항목 종류
    pub enum WishlistKind: "wishlist kind" {
        Auction => "auction",
        Rental => "rental",
    }
}

// 사용자별 위시리스트
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub user_id: i64,
    /// 추가된 순서 유지
    pub auctions: Vec<i64>,
    pub rentals: Vec<i64>,
}

impl Wishlist {
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn items(&self, kind: WishlistKind) -> &[i64] {
        match kind {
            WishlistKind::Auction => &self.auctions,
            WishlistKind::Rental => &self.rentals,
        }
    }

    /// 중복 없이 추가. 새로 추가되면 true
    pub fn add(&mut self, kind: WishlistKind, item_id: i64) -> bool {
        let items = match kind {
            WishlistKind::Auction => &mut self.auctions,
            WishlistKind::Rental => &mut self.rentals,
        };
        if items.contains(&item_id) {
            return false;
        }
        items.push(item_id);
        true
    }

    pub fn remove(&mut self, kind: WishlistKind, item_id: i64) {
        match kind {
            WishlistKind::Auction => self.auctions.retain(|id| *id != item_id),
            WishlistKind::Rental => self.rentals.retain(|id| *id != item_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::empty(3);
        assert!(wishlist.add(WishlistKind::Auction, 10));
        assert!(!wishlist.add(WishlistKind::Auction, 10));
        assert!(wishlist.add(WishlistKind::Rental, 10));
        assert_eq!(wishlist.auctions, vec![10]);
        assert_eq!(wishlist.rentals, vec![10]);
    }

    #[test]
    fn test_remove_only_touches_kind() {
        let mut wishlist = Wishlist::empty(3);
        wishlist.add(WishlistKind::Auction, 1);
        wishlist.add(WishlistKind::Auction, 2);
        wishlist.add(WishlistKind::Rental, 1);
        wishlist.remove(WishlistKind::Auction, 1);
        wishlist.remove(WishlistKind::Auction, 99);
        assert_eq!(wishlist.items(WishlistKind::Auction), &[2]);
        assert_eq!(wishlist.items(WishlistKind::Rental), &[1]);
    }
}
