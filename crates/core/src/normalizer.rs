//! Placeholder-token substitution for extract text.
//!
//! The extract encodes non-ASCII characters as `__NAME__` tokens (for example `__POUND__`
//! for `£`). A [`CharacterNormalizer`] is built once at startup from a table of
//! `(token, hex code point)` pairs and then rewrites every token in a line into the literal
//! character before the line is split into fields.

/// Tokens recognised in extract text, with the hexadecimal Unicode code point each one
/// stands for.
pub const PLACEHOLDER_TABLE: &[(&str, &str)] = &[
    ("__COPYRIGHT__", "00a9"),
    ("__REGISTERED__", "00ae"),
    ("__YEN__", "00a5"),
    ("__POUND__", "00a3"),
    ("__DEGREE__", "00b0"),
    ("__aGRAVE__", "00e0"),
    ("__eGRAVE__", "00e8"),
    ("__iGRAVE__", "00ec"),
    ("__oGRAVE__", "00f2"),
    ("__uGRAVE__", "00f9"),
    ("__AGRAVE__", "00c0"),
    ("__EGRAVE__", "00c8"),
    ("__IGRAVE__", "00cc"),
    ("__OGRAVE__", "00d2"),
    ("__UGRAVE__", "00d9"),
    ("__aCIRCUMFLEX__", "00e2"),
    ("__eCIRCUMFLEX__", "00ea"),
    ("__iCIRCUMFLEX__", "00ee"),
    ("__oCIRCUMFLEX__", "00f4"),
    ("__uCIRCUMFLEX__", "00fb"),
    ("__ACIRCUMFLEX__", "00c2"),
    ("__ECIRCUMFLEX__", "00ca"),
    ("__ICIRCUMFLEX__", "00ce"),
    ("__OCIRCUMFLEX__", "00d4"),
    ("__UCIRCUMFLEX__", "00db"),
    ("__LATINaDIAERESIS__", "00e4"),
    ("__eDIAERESIS__", "00eb"),
    ("__iDIAERESIS__", "00ef"),
    ("__oDIAERESIS__", "00f6"),
    ("__uDIAERESIS__", "00fc"),
    ("__yDIAERESIS__", "00ff"),
    ("__ADIAERESIS__", "00c4"),
    ("__EDIAERESIS__", "00cb"),
    ("__ODIAERESIS__", "00d6"),
    ("__UDIAERESIS__", "00dc"),
    ("__YDIAERESIS__", "0178"),
    ("__aTILDE__", "00e3"),
    ("__oTILDE__", "00f5"),
    ("__nTILDE__", "00f1"),
    ("__aRING__", "00e5"),
    ("__oSTROKE__", "00f8"),
    ("__sCARON__", "0161"),
    ("__ATILDE__", "00c3"),
    ("__OTILDE__", "00d5"),
    ("__NTILDE__", "00d1"),
    ("__ARING__", "00c5"),
    ("__OSTROKE__", "00d8"),
    ("__cCEDILLA__", "00e7"),
    ("__CCEDILLA__", "00c7"),
    ("__DIAERESIS__", "00a8"),
    ("__TRADEMARK__", "2122"),
    ("__EURO__", "20ac"),
    ("__CENT__", "00a2"),
    ("__CURRENCY__", "00a4"),
    ("__GAMMA__", "0194"),
    ("__RH_SINGLE__", "2019"),
    ("__LH_SINGLE__", "2018"),
    ("__LINE_FEED__", "000a"),
    ("__DASH__", "2013"),
    ("__CURVED_APOSTROPHE__", "055a"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizerError {
    #[error("token '{token}' has code point '{code}' which is not valid hexadecimal")]
    InvalidHex { token: String, code: String },
    #[error("token '{token}' maps to U+{code_point:X}, which is not a Unicode scalar value")]
    InvalidCodePoint { token: String, code_point: u32 },
    #[error("empty placeholder token in substitution table")]
    EmptyToken,
}

/// Rewrites placeholder tokens into the characters they stand for.
#[derive(Debug, Clone)]
pub struct CharacterNormalizer {
    substitutions: Vec<(String, char)>,
}

impl CharacterNormalizer {
    /// Builds a normalizer from [`PLACEHOLDER_TABLE`].
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizerError`] naming the first malformed table entry.
    pub fn new() -> Result<Self, NormalizerError> {
        Self::from_table(PLACEHOLDER_TABLE)
    }

    /// Builds a normalizer from an arbitrary `(token, hex code point)` table.
    ///
    /// # Errors
    ///
    /// - [`NormalizerError::EmptyToken`] if a token is empty
    /// - [`NormalizerError::InvalidHex`] if a code is not hexadecimal
    /// - [`NormalizerError::InvalidCodePoint`] if a code is a surrogate or out of range
    pub fn from_table(table: &[(&str, &str)]) -> Result<Self, NormalizerError> {
        let substitutions = table
            .iter()
            .map(|&(token, code)| {
                if token.is_empty() {
                    return Err(NormalizerError::EmptyToken);
                }
                let code_point =
                    u32::from_str_radix(code, 16).map_err(|_| NormalizerError::InvalidHex {
                        token: token.to_string(),
                        code: code.to_string(),
                    })?;
                let ch = char::from_u32(code_point).ok_or_else(|| {
                    NormalizerError::InvalidCodePoint {
                        token: token.to_string(),
                        code_point,
                    }
                })?;
                Ok((token.to_string(), ch))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { substitutions })
    }

    /// Number of tokens this normalizer recognises.
    pub fn len(&self) -> usize {
        self.substitutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    /// Replaces every recognised token in `input`. Text without tokens is returned unchanged.
    pub fn normalize(&self, input: &str) -> String {
        if !input.contains("__") {
            return input.to_string();
        }

        let mut output = input.to_string();
        for (token, ch) in &self.substitutions {
            while let Some(start) = output.find(token.as_str()) {
                let mut buf = [0u8; 4];
                output.replace_range(start..start + token.len(), ch.encode_utf8(&mut buf));
            }
        }
        output
    }
}
