//! JSON implementation of the wire codec.

use serde_json::Value;

use crate::domain::{ClientIntent, CodecError, RoomMessage, Session, WireCodec};

use super::dto::websocket::{ClientIntentDto, INTENT_TYPES, ServerFrame, SessionAttachment};

/// Encodes frames as the JSON objects described by the wire contract
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWireCodec;

impl JsonWireCodec {
    fn encode<T: serde::Serialize>(value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }
}

impl WireCodec for JsonWireCodec {
    fn decode_intent(&self, payload: &str) -> Result<ClientIntent, CodecError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| CodecError::Malformed(e.to_string()))?;

        // 未知の type は構造エラーと区別して報告する
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CodecError::Malformed("missing \"type\" field".to_string()))?;
        if !INTENT_TYPES.contains(&kind) {
            return Err(CodecError::UnknownType(kind.to_string()));
        }

        let dto: ClientIntentDto =
            serde_json::from_value(value).map_err(|e| CodecError::Malformed(e.to_string()))?;
        Ok(dto.into())
    }

    fn encode_message(&self, message: &RoomMessage) -> Result<String, CodecError> {
        Self::encode(&ServerFrame::from(message))
    }

    fn encode_error(&self, code: &str, message: &str) -> Result<String, CodecError> {
        Self::encode(&ServerFrame::Error {
            code: code.to_string(),
            message: message.to_string(),
        })
    }

    fn encode_session(&self, session: &Session) -> Result<String, CodecError> {
        Self::encode(&SessionAttachment::from(session))
    }

    fn decode_session(&self, attachment: &str) -> Result<Session, CodecError> {
        let dto: SessionAttachment = serde_json::from_str(attachment)
            .map_err(|e| CodecError::CorruptAttachment(e.to_string()))?;
        Session::try_from(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, MessageContent, Timestamp};
    use serde_json::json;

    fn to_value(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_decode_join_chat() {
        // テスト項目: join_chat が Join に変換される
        // when (操作):
        let result = JsonWireCodec.decode_intent(r#"{"type":"join_chat","username":"alice"}"#);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ClientIntent::Join {
                display_name: "alice".to_string()
            })
        );
    }

    #[test]
    fn test_decode_send_and_leave() {
        // テスト項目: send_message / leave_chat が変換される（余分なフィールドは無視）
        // when (操作):
        let send = JsonWireCodec.decode_intent(r#"{"type":"send_message","content":" hi "}"#);
        let leave = JsonWireCodec.decode_intent(r#"{"type":"leave_chat","extra":1}"#);

        // then (期待する結果):
        assert_eq!(
            send,
            Ok(ClientIntent::Send {
                content: " hi ".to_string()
            })
        );
        assert_eq!(leave, Ok(ClientIntent::Leave));
    }

    #[test]
    fn test_decode_unknown_type() {
        // テスト項目: 未知の type は UnknownType
        // when (操作):
        let result = JsonWireCodec.decode_intent(r#"{"type":"dance"}"#);

        // then (期待する結果):
        assert_eq!(result, Err(CodecError::UnknownType("dance".to_string())));
    }

    #[test]
    fn test_decode_malformed_payloads() {
        // テスト項目: JSON でない・type がない・必須フィールドがない payload は Malformed
        // given (前提条件):
        let payloads = [
            "hello",
            "{}",
            r#"{"type":42}"#,
            r#"{"type":"join_chat"}"#,
            r#"{"type":"send_message","content":5}"#,
        ];

        for payload in payloads {
            // when (操作):
            let result = JsonWireCodec.decode_intent(payload);

            // then (期待する結果):
            assert!(
                matches!(result, Err(CodecError::Malformed(_))),
                "payload {payload} should be malformed, got {result:?}"
            );
        }
    }

    #[test]
    fn test_encode_outbound_shapes() {
        // テスト項目: 各 RoomMessage が仕様どおりの JSON 形状になる
        // given (前提条件):
        let alice = DisplayName::new("alice".to_string()).unwrap();
        let ts = Timestamp::new(1700000000000);
        let chat = RoomMessage::chat(
            alice.clone(),
            MessageContent::new("hello".to_string()).unwrap(),
            ts,
        );
        let joined = RoomMessage::user_joined(alice.clone(), ts);
        let left = RoomMessage::user_left(alice, ts);
        let system = RoomMessage::system("Welcome", ts);

        // when (操作) / then (期待する結果):
        assert_eq!(
            to_value(&JsonWireCodec.encode_message(&chat).unwrap()),
            json!({"type":"message","id":chat.id().to_string(),"content":"hello","username":"alice","timestamp":1700000000000_i64})
        );
        assert_eq!(
            to_value(&JsonWireCodec.encode_message(&joined).unwrap()),
            json!({"type":"user_joined","id":joined.id().to_string(),"username":"alice","timestamp":1700000000000_i64})
        );
        assert_eq!(
            to_value(&JsonWireCodec.encode_message(&left).unwrap()),
            json!({"type":"user_left","id":left.id().to_string(),"username":"alice","timestamp":1700000000000_i64})
        );
        assert_eq!(
            to_value(&JsonWireCodec.encode_message(&system).unwrap()),
            json!({"type":"server","id":system.id().to_string(),"content":"Welcome","timestamp":1700000000000_i64})
        );
    }

    #[test]
    fn test_encode_error() {
        // テスト項目: エラーは type "error" と code / message を持つ
        // when (操作):
        let text = JsonWireCodec
            .encode_error("duplicate_username", "Username 'alice' is already taken")
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            to_value(&text),
            json!({"type":"error","code":"duplicate_username","message":"Username 'alice' is already taken"})
        );
    }

    #[test]
    fn test_session_attachment_round_trip_and_corruption() {
        // テスト項目: Session の添付は往復でき、壊れた添付は CorruptAttachment になる
        // given (前提条件):
        let session = Session::new(
            DisplayName::new("alice".to_string()).unwrap(),
            Timestamp::new(5),
        );

        // when (操作):
        let encoded = JsonWireCodec.encode_session(&session).unwrap();
        let decoded = JsonWireCodec.decode_session(&encoded);
        let corrupt = JsonWireCodec.decode_session("{not json");

        // then (期待する結果):
        assert_eq!(decoded, Ok(session));
        assert!(matches!(corrupt, Err(CodecError::CorruptAttachment(_))));
    }
}
