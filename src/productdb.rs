//! Battle.net `product.db` reader
//!
//! The agent keeps its list of installed products in an undocumented binary
//! file. Every product starts with a 4 byte frame marker (`0x0A ?? ?? 0x0A`),
//! followed by length-prefixed fields in a fixed order:
//!
//! ```text
//! marker[4] len name[len] tag[1] len code[len] pad[3] len path[len]
//! ```
//!
//! The file is only ever read. Every call parses it from scratch.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::bytes::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Key that is always present in a populated database: the agent itself.
pub const ROOT_ENTRY: &str = "battle.net";

static RECORD_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    // `.` in non-unicode mode is any byte except '\n'
    Regex::new(r"(?-u)\x0A..\x0A").expect("record anchor pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub gameid: String,
    pub path: String,
    pub code: String,
}

pub type ProductDb = BTreeMap<String, ProductRecord>;

/// Byte cursor that reports truncation instead of panicking.
struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.buf.len().saturating_sub(self.offset);
        if n > available {
            return Err(Error::TruncatedRecord {
                offset: self.offset,
                needed: n,
                available,
            });
        }
        let bytes = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn text_field(&mut self) -> Result<String> {
        let len = self.take(1)?[0] as usize;
        let start = self.offset;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::MalformedRecord {
            offset: start,
            reason: e.to_string(),
        })
    }
}

/// Parse every product record in `buf`.
///
/// Later records with the same game id replace earlier ones. Scanning resumes
/// after the last byte a record consumed, so marker-like bytes inside a field
/// never start a new record.
pub fn parse_products(buf: &[u8]) -> Result<ProductDb> {
    let mut products = ProductDb::new();
    let mut pos = 0;

    while let Some(anchor) = RECORD_ANCHOR.find_at(buf, pos) {
        let mut cursor = Cursor {
            buf,
            offset: anchor.start(),
        };
        cursor.skip(4)?;
        let gameid = cursor.text_field()?;
        cursor.skip(1)?;
        let code = cursor.text_field()?;
        cursor.skip(3)?;
        let path = cursor.text_field()?;

        pos = cursor.offset;
        products.insert(gameid.clone(), ProductRecord { gameid, path, code });
    }

    Ok(products)
}

/// Read the product database at `path`.
///
/// Returns `Ok(None)` when the file does not exist or when it carries no
/// [`ROOT_ENTRY`], which is what an empty or foreign file looks like.
pub fn read_product_db(path: &Path) -> Result<Option<ProductDb>> {
    if !path.exists() {
        return Ok(None);
    }

    let buf = std::fs::read(path)?;
    let products = parse_products(&buf)?;

    if !products.contains_key(ROOT_ENTRY) {
        tracing::error!(path = %path.display(), "Battle.net product database is empty");
        return Ok(None);
    }

    tracing::debug!(path = %path.display(), count = products.len(), "Read product database");
    Ok(Some(products))
}
