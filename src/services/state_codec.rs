//! 状态编解码服务 - 业务能力层
//!
//! 令牌格式：`base64url(zlib(json(Quiz)))`，不带填充。
//! 服务端不保存任何测验状态，令牌即完整测验。

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::fmt;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::Quiz;

const INFLATE_CHUNK: usize = 4096;

/// 不透明的 URL 安全令牌
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// 重定向地址，如 `/quiz?data=<token>`
    pub fn redirect_target(&self, route: &str) -> String {
        format!("{}?data={}", route, self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 编码错误
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("测验序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("压缩失败: {0}")]
    Compress(#[from] std::io::Error),
}

/// 解码错误，每一类都原样交给调用方
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("令牌为空")]
    Empty,
    #[error("令牌不是有效的 base64url 文本: {0}")]
    Text(#[from] base64::DecodeError),
    #[error("压缩数据损坏或被截断: {0}")]
    Compression(String),
    #[error("解压后数据超过上限 {limit} 字节")]
    TooLarge { limit: usize },
    #[error("令牌内容与测验结构不符: {0}")]
    Payload(#[from] serde_json::Error),
}

/// 状态编解码器
#[derive(Debug, Clone, Copy)]
pub struct StateCodec {
    level: Compression,
    max_payload_bytes: usize,
}

impl Default for StateCodec {
    fn default() -> Self {
        Self::new(6, 1024 * 1024)
    }
}

impl StateCodec {
    /// `level` 取值 0-9，超出按 9 处理
    pub fn new(level: u32, max_payload_bytes: usize) -> Self {
        Self {
            level: Compression::new(level.min(9)),
            max_payload_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.compression_level, config.max_payload_bytes)
    }

    pub fn encode(&self, quiz: &Quiz) -> Result<Token, EncodeError> {
        let json = serde_json::to_vec(quiz)?;

        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        let token = URL_SAFE_NO_PAD.encode(&compressed);
        debug!(
            "编码测验: json {} 字节 → 压缩 {} 字节 → 令牌 {} 字符",
            json.len(),
            compressed.len(),
            token.len()
        );
        Ok(Token(token))
    }

    pub fn decode(&self, token: &str) -> Result<Quiz, DecodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeError::Empty);
        }

        let compressed = URL_SAFE_NO_PAD.decode(token)?;
        let json = self.inflate(&compressed)?;
        let quiz = serde_json::from_slice(&json)?;
        Ok(quiz)
    }

    fn inflate(&self, compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut inflater = Decompress::new(true);
        let mut json = Vec::new();

        loop {
            if json.len() > self.max_payload_bytes {
                return Err(DecodeError::TooLarge {
                    limit: self.max_payload_bytes,
                });
            }
            json.reserve(INFLATE_CHUNK);

            let (before_in, before_out) = (inflater.total_in(), inflater.total_out());
            let status = inflater
                .decompress_vec(
                    &compressed[before_in as usize..],
                    &mut json,
                    FlushDecompress::None,
                )
                .map_err(|e| DecodeError::Compression(e.to_string()))?;

            match status {
                // 到达流末尾时 Adler-32 已校验
                Status::StreamEnd => break,
                _ if inflater.total_in() == before_in && inflater.total_out() == before_out => {
                    return Err(DecodeError::Compression("压缩流被截断".to_string()));
                }
                _ => {}
            }
        }

        if json.len() > self.max_payload_bytes {
            return Err(DecodeError::TooLarge {
                limit: self.max_payload_bytes,
            });
        }
        let consumed = inflater.total_in() as usize;
        if consumed != compressed.len() {
            return Err(DecodeError::Compression(format!(
                "压缩流之后还有 {} 个多余字节",
                compressed.len() - consumed
            )));
        }

        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CorrectAnswers, Question};

    fn sample_quiz() -> Quiz {
        Quiz {
            title: "地理 & Geography?".to_string(),
            questions: vec![
                Question {
                    number: 1,
                    title: "Capital?".to_string(),
                    answers: vec!["Paris".to_string(), "Lyon".to_string()],
                    correct_answer: Some(1),
                },
                Question {
                    number: 2,
                    title: String::new(),
                    answers: Vec::new(),
                    correct_answer: None,
                },
            ],
            correct_answers: vec![(1, 1)].into_iter().collect::<CorrectAnswers>(),
        }
    }

    #[test]
    fn test_round_trip() {
        let codec = StateCodec::default();
        let quiz = sample_quiz();
        let token = codec.encode(&quiz).unwrap();
        assert_eq!(codec.decode(token.as_str()).unwrap(), quiz);
    }

    #[test]
    fn test_round_trip_empty_quiz() {
        let codec = StateCodec::default();
        let quiz = Quiz::default();
        let token = codec.encode(&quiz).unwrap();
        assert_eq!(codec.decode(token.as_str()).unwrap(), quiz);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = StateCodec::default().encode(&sample_quiz()).unwrap();
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(
            token.redirect_target("/quiz"),
            format!("/quiz?data={}", token)
        );
    }

    #[test]
    fn test_every_single_character_flip_is_rejected() {
        let codec = StateCodec::default();
        let token = codec.encode(&sample_quiz()).unwrap().into_string();
        let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            let original = bytes[i];
            // 换成字母表中的另一个字符，保证仍是合法的 base64 文本
            bytes[i] = alphabet[(alphabet.iter().position(|c| *c == original).unwrap() + 1) % 64];
            let flipped = String::from_utf8(bytes).unwrap();
            assert!(
                codec.decode(&flipped).is_err(),
                "第 {} 个字符被修改后仍然解码成功",
                i
            );
        }
    }

    #[test]
    fn test_decode_error_kinds() {
        let codec = StateCodec::default();

        assert!(matches!(codec.decode("  "), Err(DecodeError::Empty)));
        assert!(matches!(codec.decode("ab$c"), Err(DecodeError::Text(_))));

        let not_zlib = URL_SAFE_NO_PAD.encode(b"plain text");
        assert!(matches!(
            codec.decode(&not_zlib),
            Err(DecodeError::Compression(_))
        ));

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"name":"not a quiz"}"#).unwrap();
        let wrong_shape = URL_SAFE_NO_PAD.encode(encoder.finish().unwrap());
        assert!(matches!(
            codec.decode(&wrong_shape),
            Err(DecodeError::Payload(_))
        ));
    }

    #[test]
    fn test_truncated_token_is_rejected() {
        let codec = StateCodec::default();
        let token = codec.encode(&sample_quiz()).unwrap().into_string();
        let truncated = &token[..token.len() - 4];
        assert!(codec.decode(truncated).is_err());
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let codec = StateCodec::default();
        let token = codec.encode(&sample_quiz()).unwrap().into_string();
        let mut compressed = URL_SAFE_NO_PAD.decode(&token).unwrap();
        compressed.extend_from_slice(b"junk");
        let padded = URL_SAFE_NO_PAD.encode(compressed);
        assert!(matches!(
            codec.decode(&padded),
            Err(DecodeError::Compression(_))
        ));
    }

    #[test]
    fn test_payload_limit() {
        let codec = StateCodec::new(6, 16);
        let token = codec.encode(&sample_quiz()).unwrap();
        assert!(matches!(
            codec.decode(token.as_str()),
            Err(DecodeError::TooLarge { limit: 16 })
        ));
    }
}
