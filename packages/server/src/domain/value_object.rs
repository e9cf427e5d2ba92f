//! Value objects
//!
//! 不変条件をコンストラクタで検証する値オブジェクト群。
//! 生成に成功した値は常に正しいことが保証されます。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// 表示名の最大文字数
pub const MAX_USERNAME_LENGTH: usize = 32;

/// メッセージ本文の最大文字数
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// Maximum length of a room identifier
const MAX_ROOM_ID_LENGTH: usize = 64;

/// Room identifier taken from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Validate and wrap a room identifier.
    ///
    /// Allowed characters are ASCII alphanumerics, `-` and `_`.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() || value.len() > MAX_ROOM_ID_LENGTH {
            return Err(ValueObjectError::InvalidRoomId(value));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueObjectError::InvalidRoomId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable per-transport key, assigned when the host accepts a connection.
///
/// Registry entries are keyed by this value rather than by the transport object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionKey(Uuid);

impl ConnectionKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection id minted for a `Session` at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique id of a `RoomMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 参加者の表示名
///
/// 前後の空白は取り除かれ、空文字列と `MAX_USERNAME_LENGTH` 超過は拒否されます。
/// 重複判定は大文字小文字を区別した完全一致で行います。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        let length = trimmed.chars().count();
        if length > MAX_USERNAME_LENGTH {
            return Err(ValueObjectError::DisplayNameTooLong {
                length,
                max: MAX_USERNAME_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文（トリム済み、空でない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let length = trimmed.chars().count();
        if length > MAX_CONTENT_LENGTH {
            return Err(ValueObjectError::MessageContentTooLong {
                length,
                max: MAX_CONTENT_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Content for server-authored messages; not subject to client limits.
    pub(crate) fn system(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageContent> for String {
    fn from(value: MessageContent) -> Self {
        value.0
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_trimmed() {
        // テスト項目: 表示名の前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  alice  ".to_string();

        // when (操作):
        let name = DisplayName::new(raw);

        // then (期待する結果):
        assert_eq!(name.map(DisplayName::into_string), Ok("alice".to_string()));
    }

    #[test]
    fn test_display_name_rejects_blank() {
        // テスト項目: 空白のみの表示名は拒否される
        // given (前提条件):
        let inputs = ["", "   ", "\t\n"];

        for input in inputs {
            // when (操作):
            let result = DisplayName::new(input.to_string());

            // then (期待する結果):
            assert_eq!(result, Err(ValueObjectError::DisplayNameEmpty));
        }
    }

    #[test]
    fn test_display_name_rejects_too_long() {
        // テスト項目: 最大文字数を超える表示名は拒否される
        // given (前提条件):
        let raw = "a".repeat(MAX_USERNAME_LENGTH + 1);

        // when (操作):
        let result = DisplayName::new(raw);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ValueObjectError::DisplayNameTooLong { .. })
        ));
    }

    #[test]
    fn test_display_name_is_case_sensitive() {
        // テスト項目: 表示名の比較は大文字小文字を区別する
        // given (前提条件):
        let lower = DisplayName::new("alice".to_string());
        let upper = DisplayName::new("Alice".to_string());

        // then (期待する結果):
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_message_content_trimming_and_validation() {
        // テスト項目: メッセージ本文はトリムされ、空白のみは拒否される
        // when (操作):
        let empty = MessageContent::new(String::new());
        let blank = MessageContent::new("   ".to_string());
        let padded = MessageContent::new(" hi ".to_string());

        // then (期待する結果):
        assert_eq!(empty, Err(ValueObjectError::MessageContentEmpty));
        assert_eq!(blank, Err(ValueObjectError::MessageContentEmpty));
        assert_eq!(padded.map(MessageContent::into_string), Ok("hi".to_string()));
    }

    #[test]
    fn test_message_content_rejects_too_long() {
        // テスト項目: 最大文字数を超える本文は拒否される
        // given (前提条件):
        let raw = "x".repeat(MAX_CONTENT_LENGTH + 1);

        // when (操作):
        let result = MessageContent::new(raw);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ValueObjectError::MessageContentTooLong { .. })
        ));
    }

    #[test]
    fn test_message_content_deserialization_is_validated() {
        // テスト項目: デシリアライズでもトリムと空チェックが適用される
        // given (前提条件):
        let padded = r#""  hi  ""#;
        let blank = r#""   ""#;

        // when (操作):
        let padded = serde_json::from_str::<MessageContent>(padded);
        let blank = serde_json::from_str::<MessageContent>(blank);

        // then (期待する結果):
        assert_eq!(padded.unwrap().as_str(), "hi");
        assert!(blank.is_err());
    }

    #[test]
    fn test_room_id_validation() {
        // テスト項目: ルーム ID は英数字・ハイフン・アンダースコアのみ許可される
        // then (期待する結果):
        assert!(RoomId::new("lobby".to_string()).is_ok());
        assert!(RoomId::new("team_a-1".to_string()).is_ok());
        assert!(RoomId::new(String::new()).is_err());
        assert!(RoomId::new("has space".to_string()).is_err());
        assert!(RoomId::new("../etc".to_string()).is_err());
    }
}
