/// 공통 모델 도우미
/// 텍스트 컬럼 상태값, 요청 본문의 느슨한 숫자 필드 처리
use serde_json::Value;
use thiserror::Error;

/// 저장소에서 읽은 문자열이 어떤 상태값과도 맞지 않을 때
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// 문자열 상태값 enum 정의
/// `as_str`, `TryFrom<String>`, `Display` 를 함께 구현한다.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::convert::TryFrom<String> for $name {
            type Error = $crate::model::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::model::UnknownVariant { kind: $kind, value }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;

/// 요청 본문 값이 입력된 것으로 볼 수 있는지 (null, 빈 문자열, 0, false 제외)
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// 숫자 또는 숫자 문자열 id
pub fn value_as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 숫자 또는 숫자 문자열 금액
pub fn value_as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::StartedAuction;
    use serde_json::json;

    #[test]
    fn test_text_enum_round_trip() {
        assert_eq!(
            StartedAuction::try_from("ended".to_string()).unwrap(),
            StartedAuction::Ended
        );
        assert_eq!(StartedAuction::Yes.as_str(), "yes");

        let err = StartedAuction::try_from("maybe".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "unknown started_auction value: maybe");
    }

    #[test]
    fn test_loose_numbers() {
        assert_eq!(value_as_id(&json!("17")), Some(17));
        assert_eq!(value_as_id(&json!(17)), Some(17));
        assert_eq!(value_as_id(&json!("x17")), None);
        assert_eq!(value_as_amount(&json!(" 2500.5 ")), Some(2500.5));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!(null)));
        assert!(is_present(&json!("0x")));
    }
}
