//! Flat image layout files
//!
//! A layout lists the components of an image in TOML, one `[[image]]` table
//! per component, in the order they are handed to the image list:
//!
//! ```toml
//! [[image]]
//! kind = "scfw"
//! file = "scfw_tcm.bin"
//! offset = 0x400
//! pad = "align4"
//!
//! [[image]]
//! kind = "ap"
//! file = "u-boot-atf.bin"
//! offset = 0x8000
//! pad = "fill"
//! size = 0x100000
//! core = "a35"
//! entry = 0x80000000
//! ```

use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MkImageError, Result};
use crate::image_list::{IMG_STACK_SIZE, ImageDescriptor, ImageList};
use crate::image_types::{CoreId, ImageKind, MessageUnit};
use crate::placement::{PadMode, place};

fn default_capacity() -> usize {
    IMG_STACK_SIZE
}

/// Core given either by name (`"a53"`) or by numeric id
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CoreSpec {
    Id(u32),
    Name(String),
}

impl CoreSpec {
    pub fn id(&self) -> Result<u32> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Name(name) => Ok(name.parse::<CoreId>()?.id()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LayoutImage {
    pub kind: String,
    pub file: Option<PathBuf>,
    /// Byte offset of the component in the output image
    pub offset: Option<u64>,
    #[serde(default)]
    pub pad: PadMode,
    /// Target size for `pad = "fill"`
    pub size: Option<u64>,
    pub entry: Option<u64>,
    pub load: Option<u64>,
    pub core: Option<CoreSpec>,
    pub partition: Option<u32>,
    pub mu: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default, rename = "image")]
    pub images: Vec<LayoutImage>,
    /// Directory relative `file` paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl FromStr for Layout {
    type Err = MkImageError;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| MkImageError::layout(e.to_string()))
    }
}

impl Layout {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MkImageError::file(path, e))?;
        let mut layout: Layout = text
            .parse()
            .map_err(|e| MkImageError::layout(format!("{}: {e}", path.display())))?;
        layout.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(layout)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base_dir.join(file)
        }
    }

    fn descriptor(&self, image: &LayoutImage) -> Result<ImageDescriptor> {
        let kind: ImageKind = image.kind.parse()?;
        if kind.has_source() && image.file.is_none() {
            return Err(MkImageError::layout(format!("{kind} image needs a file")));
        }
        let mut desc = ImageDescriptor::new(kind);
        desc.source = image.file.as_deref().map(|f| self.resolve(f));
        desc.entry = image.entry;
        desc.load = image.load;
        desc.core_id = image.core.as_ref().map(CoreSpec::id).transpose()?;
        desc.partition = image.partition;
        desc.routing = image
            .mu
            .as_deref()
            .map(|mu| mu.parse::<MessageUnit>().map(MessageUnit::resource_id))
            .transpose()?;
        Ok(desc)
    }

    /// Build the closed image list described by this layout
    pub fn image_list(&self) -> Result<ImageList> {
        let mut list = ImageList::with_capacity(self.capacity);
        for image in &self.images {
            list.push(self.descriptor(image)?)?;
        }
        list.close()?;
        Ok(list)
    }

    /// Place every component with a file into `output`.
    ///
    /// Returns the offset of the byte past the furthest component.
    pub fn emit<W: Write + Seek>(&self, output: &mut W) -> Result<u64> {
        let list = self.image_list()?;
        let mut end = 0;

        for (index, (image, desc)) in self.images.iter().zip(list.components()).enumerate() {
            let Some(source) = desc.source_path() else {
                continue;
            };
            let offset = image.offset.ok_or_else(|| {
                MkImageError::layout(format!("image {index} ({}) has a file but no offset", desc.kind))
            })?;
            let target = match (image.pad, image.size) {
                (PadMode::FillToSize, None) => {
                    return Err(MkImageError::layout(format!(
                        "image {index} ({}) uses pad = \"fill\" without a size",
                        desc.kind
                    )));
                }
                (_, size) => size.unwrap_or(0),
            };
            let written = place(output, source, target, offset, image.pad)?;
            end = end.max(offset + written);
        }

        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"
[[image]]
kind = "container"

[[image]]
kind = "scfw"
file = "scfw_tcm.bin"
offset = 0x400
pad = "align4"

[[image]]
kind = "ap"
file = "/abs/u-boot-atf.bin"
offset = 0x8000
core = "a35"
mu = "mu3"
partition = 3
entry = 0x80000000
"#;

    #[test]
    fn test_parse_layout() {
        let mut layout: Layout = LAYOUT.parse().unwrap();
        layout.base_dir = PathBuf::from("/work");
        assert_eq!(layout.capacity, IMG_STACK_SIZE);
        assert_eq!(layout.images.len(), 3);
        assert_eq!(layout.images[1].pad, PadMode::AlignTo4);
        assert_eq!(layout.images[2].pad, PadMode::None);

        let list = layout.image_list().unwrap();
        assert!(list.is_closed());
        let descs: Vec<&ImageDescriptor> = list.components().collect();
        assert_eq!(descs[0].kind, ImageKind::NewContainer);
        assert_eq!(
            descs[1].source_path(),
            Some(Path::new("/work/scfw_tcm.bin"))
        );
        assert_eq!(descs[2].source_path(), Some(Path::new("/abs/u-boot-atf.bin")));
        assert_eq!(descs[2].core_id, Some(CoreId::Ca35.id()));
        assert_eq!(descs[2].routing, Some(216));
        assert_eq!(descs[2].partition, Some(3));
        assert_eq!(descs[2].entry, Some(0x8000_0000));
    }

    #[test]
    fn test_numeric_core() {
        let layout: Layout = "[[image]]\nkind = \"m4\"\nfile = \"m4.bin\"\ncore = 1\n".parse().unwrap();
        let list = layout.image_list().unwrap();
        assert_eq!(list.iter().next().unwrap().core_id, Some(1));
    }

    #[test]
    fn test_unknown_kind() {
        let layout: Layout = "[[image]]\nkind = \"kernel\"\n".parse().unwrap();
        assert!(matches!(
            layout.image_list(),
            Err(MkImageError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_capacity_from_layout() {
        let text = "capacity = 2\n[[image]]\nkind = \"hold\"\n[[image]]\nkind = \"hold\"\n";
        let layout: Layout = text.parse().unwrap();
        assert!(matches!(
            layout.image_list(),
            Err(MkImageError::Capacity { max: 2, .. })
        ));
    }

    #[test]
    fn test_component_without_file() {
        let layout: Layout = "[[image]]\nkind = \"scfw\"\noffset = 0x400\n".parse().unwrap();
        let err = layout.image_list().unwrap_err();
        assert!(matches!(err, MkImageError::Layout(_)));
        assert!(err.to_string().contains("scfw"));

        let mut out = std::io::Cursor::new(Vec::new());
        assert!(layout.emit(&mut out).is_err());
        assert!(out.into_inner().is_empty());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            "[[image]]\nkind = ".parse::<Layout>(),
            Err(MkImageError::Layout(_))
        ));
    }

    #[test]
    fn test_fill_without_size() {
        let layout: Layout = "[[image]]\nkind = \"scd\"\nfile = \"/x\"\noffset = 0\npad = \"fill\"\n"
            .parse()
            .unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        assert!(matches!(layout.emit(&mut out), Err(MkImageError::Layout(_))));
    }
}
