//! Ordered, bounded list of container components

use std::path::{Path, PathBuf};

use crate::error::{MkImageError, Result};
use crate::image_types::ImageKind;

/// Default number of list slots, the terminal sentinel included
pub const IMG_STACK_SIZE: usize = 32;

/// One component handed to the container assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub kind: ImageKind,
    pub source: Option<PathBuf>,
    pub entry: Option<u64>,
    pub load: Option<u64>,
    pub core_id: Option<u32>,
    pub partition: Option<u32>,
    /// Messaging unit resource id
    pub routing: Option<u32>,
}

impl ImageDescriptor {
    pub fn new(kind: ImageKind) -> Self {
        Self {
            kind,
            source: None,
            entry: None,
            load: None,
            core_id: None,
            partition: None,
            routing: None,
        }
    }

    /// The sentinel closing every list
    pub fn end() -> Self {
        Self::new(ImageKind::End)
    }

    pub fn is_end(&self) -> bool {
        self.kind == ImageKind::End
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn entry(mut self, addr: u64) -> Self {
        self.entry = Some(addr);
        self
    }

    pub fn core_id(mut self, id: u32) -> Self {
        self.core_id = Some(id);
        self
    }

    pub fn partition(mut self, id: u32) -> Self {
        self.partition = Some(id);
        self
    }

    pub fn routing(mut self, id: u32) -> Self {
        self.routing = Some(id);
        self
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Append-only list of descriptors with a fixed capacity.
///
/// The capacity counts the sentinel, so at most `capacity - 1` components
/// can be pushed before [`ImageList::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageList {
    items: Vec<ImageDescriptor>,
    capacity: usize,
    closed: bool,
}

impl ImageList {
    pub fn new() -> Self {
        Self::with_capacity(IMG_STACK_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            closed: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries, the sentinel included once closed
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn push(&mut self, desc: ImageDescriptor) -> Result<()> {
        if self.closed {
            return Err(MkImageError::Protocol("image list is already closed"));
        }
        if desc.is_end() {
            return Err(MkImageError::Protocol(
                "the end sentinel is appended by closing the list",
            ));
        }
        if self.items.len() + 1 >= self.capacity {
            return Err(MkImageError::Capacity {
                what: "image list",
                max: self.capacity,
            });
        }
        debug!("image[{}]: {}", self.items.len(), desc.kind);
        self.items.push(desc);
        Ok(())
    }

    /// Append the terminal sentinel
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(MkImageError::Protocol("image list closed twice"));
        }
        if self.items.len() >= self.capacity {
            return Err(MkImageError::Capacity {
                what: "image list",
                max: self.capacity,
            });
        }
        self.items.push(ImageDescriptor::end());
        self.closed = true;
        Ok(())
    }

    /// All entries, the sentinel included once closed
    pub fn iter(&self) -> std::slice::Iter<'_, ImageDescriptor> {
        self.items.iter()
    }

    /// Components only, without the sentinel
    pub fn components(&self) -> impl Iterator<Item = &ImageDescriptor> {
        self.items.iter().filter(|d| !d.is_end())
    }

    /// Hand the closed list to its consumer
    pub fn into_descriptors(self) -> Result<Vec<ImageDescriptor>> {
        if !self.closed {
            return Err(MkImageError::Protocol("image list used before it was closed"));
        }
        Ok(self.items)
    }
}

impl Default for ImageList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ImageList {
    type Item = &'a ImageDescriptor;
    type IntoIter = std::slice::Iter<'a, ImageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
