//! Apple flattened device tree
//!
//! The tree carries no total length. A node is a `{properties, children}`
//! header followed by its properties and then its child nodes, so the size
//! of a node is only known after walking everything nested under it.
//!
//! ```text
//! node     := u32 properties_nb, u32 children_nb, property*, node*
//! property := [u8; 32] name, u32 len, value[len], pad to 4
//! ```

use crate::error::{BootError, Result};

/// Size of a node header
pub const NODE_HEADER_SIZE: usize = 8;

/// Length of the fixed property name field
pub const PROPERTY_NAME_LEN: usize = 32;

/// Name field plus the value length
pub const PROPERTY_HEADER_SIZE: usize = PROPERTY_NAME_LEN + 4;

const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

fn read_u32(blob: &[u8], offset: usize) -> Result<u32> {
    let bytes = offset
        .checked_add(4)
        .and_then(|end| blob.get(offset..end))
        .ok_or(BootError::TruncatedTree { offset })?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Serialized length of the tree rooted at the start of `blob`
pub fn length(blob: &[u8]) -> Result<u32> {
    Node::parse(blob, 0)?.length()
}

/// One tree node inside a blob
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    blob: &'a [u8],
    offset: usize,
    properties_nb: u32,
    children_nb: u32,
}

impl<'a> Node<'a> {
    /// Read the node header at `offset`.
    ///
    /// A short header reports the node's own offset.
    pub fn parse(blob: &'a [u8], offset: usize) -> Result<Self> {
        let truncated = |_| BootError::TruncatedTree { offset };
        Ok(Node {
            blob,
            offset,
            properties_nb: read_u32(blob, offset).map_err(truncated)?,
            children_nb: read_u32(blob, offset + 4).map_err(truncated)?,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn properties_nb(&self) -> u32 {
        self.properties_nb
    }

    pub fn children_nb(&self) -> u32 {
        self.children_nb
    }

    /// Properties of this node, in order
    pub fn properties(&self) -> Properties<'a> {
        Properties {
            blob: self.blob,
            offset: self.offset + NODE_HEADER_SIZE,
            remaining: self.properties_nb,
        }
    }

    /// Direct children of this node, in order
    pub fn children(&self) -> Result<Children<'a>> {
        Ok(Children {
            blob: self.blob,
            offset: self.properties_end()?,
            remaining: self.children_nb,
        })
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Result<Option<Property<'a>>> {
        for property in self.properties() {
            let property = property?;
            if property.name_str() == name {
                return Ok(Some(property));
            }
        }
        Ok(None)
    }

    /// Serialized length of this node and everything nested under it
    pub fn length(&self) -> Result<u32> {
        let end = self.end()?;
        u32::try_from(end - self.offset).map_err(|_| BootError::TruncatedTree {
            offset: self.offset,
        })
    }

    fn properties_end(&self) -> Result<usize> {
        let mut properties = self.properties();
        for property in properties.by_ref() {
            property?;
        }
        Ok(properties.offset)
    }

    /// Offset just past the last byte of this subtree
    fn end(&self) -> Result<usize> {
        let mut offset = self.properties_end()?;

        for _ in 0..self.children_nb {
            offset = Node::parse(self.blob, offset)?.end()?;
        }

        Ok(offset)
    }
}

/// A named property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<'a> {
    /// NUL-padded name field
    pub name: &'a [u8],
    /// Value bytes, without padding
    pub value: &'a [u8],
}

impl<'a> Property<'a> {
    /// Name without NUL padding
    pub fn name_str(&self) -> &'a str {
        let len = self.name.iter().position(|&c| c == 0).unwrap_or(self.name.len());
        core::str::from_utf8(&self.name[..len]).unwrap_or("<invalid>")
    }

    /// Value as a little-endian `u32`, if it is at least four bytes
    pub fn as_u32(&self) -> Option<u32> {
        let bytes = self.value.get(..4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Iterator over the properties of a node
pub struct Properties<'a> {
    blob: &'a [u8],
    offset: usize,
    remaining: u32,
}

impl<'a> Iterator for Properties<'a> {
    type Item = Result<Property<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let offset = self.offset;
        let parsed = read_u32(self.blob, offset + PROPERTY_NAME_LEN).and_then(|len| {
            let value_start = offset + PROPERTY_HEADER_SIZE;
            let value_end = value_start
                .checked_add(len as usize)
                .filter(|&end| end <= self.blob.len())
                .ok_or(BootError::TruncatedTree { offset })?;

            let property = Property {
                name: &self.blob[offset..offset + PROPERTY_NAME_LEN],
                value: &self.blob[value_start..value_end],
            };
            Ok((property, value_start + pad4(len as usize)))
        });

        match parsed {
            Ok((property, next)) => {
                self.remaining -= 1;
                self.offset = next;
                Some(Ok(property))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    blob: &'a [u8],
    offset: usize,
    remaining: u32,
}

impl<'a> Iterator for Children<'a> {
    type Item = Result<Node<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let parsed = Node::parse(self.blob, self.offset).and_then(|node| Ok((node, node.end()?)));

        match parsed {
            Ok((node, end)) => {
                self.remaining -= 1;
                self.offset = end;
                Some(Ok(node))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}
