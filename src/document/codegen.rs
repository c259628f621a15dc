//! # Code Generation
//!
//! Converts print documents to ESC/POS bytes.

use super::{Directive, PrintDocument};
use crate::protocol::Encoder;

impl PrintDocument {
    /// Encode every directive, in order, into one byte stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();

        for directive in &self.directives {
            match directive {
                Directive::Reset => {
                    enc.reset();
                }
                Directive::Text { content, options } => {
                    enc.text(content, *options);
                }
                Directive::Separator { ch, length } => {
                    enc.separator(*ch, *length);
                }
                Directive::Cut => {
                    enc.cut();
                }
            }
        }

        enc.finish()
    }
}
