//! Groups raw byte tokens into runs that decode as text.
//!
//! Subword tokenizers routinely split one multi-byte UTF-8 character across
//! several tokens. Each token on its own fails a strict decode, so tokens are
//! accumulated until their concatenation decodes, and the run is emitted as a
//! single [`TokenGroup`].

use crate::model::{concat_bytes, Token, TokenGroup};

/// Byte-to-text decoding that fails instead of substituting replacement
/// characters.
pub trait StrictDecoder {
    fn try_decode(&self, bytes: &[u8]) -> Option<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8Decoder;

impl StrictDecoder for Utf8Decoder {
    fn try_decode(&self, bytes: &[u8]) -> Option<String> {
        std::str::from_utf8(bytes).ok().map(str::to_string)
    }
}

impl<D: StrictDecoder + ?Sized> StrictDecoder for &D {
    fn try_decode(&self, bytes: &[u8]) -> Option<String> {
        (**self).try_decode(bytes)
    }
}

/// Output of [`TokenGrouper::split`]: the decoded groups and any trailing
/// tokens that never formed a decodable run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouping {
    pub groups: Vec<TokenGroup>,
    pub pending: Vec<Token>,
}

impl Grouping {
    pub fn pending_bytes(&self) -> Vec<u8> {
        concat_bytes(&self.pending)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TokenGrouper<D = Utf8Decoder> {
    decoder: D,
}

impl TokenGrouper<Utf8Decoder> {
    pub fn utf8() -> Self {
        Self {
            decoder: Utf8Decoder,
        }
    }
}

impl<D: StrictDecoder> TokenGrouper<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Groups `tokens`, dropping a trailing run that never decodes.
    pub fn group(&self, tokens: impl IntoIterator<Item = Token>) -> Vec<TokenGroup> {
        self.split(tokens).groups
    }

    pub fn split(&self, tokens: impl IntoIterator<Item = Token>) -> Grouping {
        let mut groups: Vec<TokenGroup> = Vec::new();
        let mut pending: Vec<Token> = Vec::new();
        let mut buf: Vec<u8> = Vec::new();

        for token in tokens {
            buf.extend_from_slice(&token.bytes);
            pending.push(token);
            if let Some(text) = self.decoder.try_decode(&buf) {
                groups.push(TokenGroup {
                    tokens: std::mem::take(&mut pending),
                    text,
                });
                buf.clear();
            }
        }

        if !pending.is_empty() {
            tracing::trace!(
                tokens = pending.len(),
                bytes = buf.len(),
                "trailing tokens did not decode"
            );
        }

        Grouping { groups, pending }
    }
}

pub fn group_tokens(tokens: impl IntoIterator<Item = Token>) -> Vec<TokenGroup> {
    TokenGrouper::utf8().group(tokens)
}
