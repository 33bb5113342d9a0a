//! IO element property catalogues, loaded from YAML.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CodecError, Result};

/// FM11XY catalogue shipped with the crate.
const BUNDLED_FM11XY: &str = include_str!("tables/fm11xy.yaml");

/// Typed reinterpretation applied to an element value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionTag {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    RawBytes,
}

impl ConversionTag {
    /// Value width the tag requires, `None` for raw bytes of any length.
    pub const fn width(&self) -> Option<usize> {
        match self {
            ConversionTag::Bool | ConversionTag::Uint8 | ConversionTag::Int8 => Some(1),
            ConversionTag::Uint16 | ConversionTag::Int16 => Some(2),
            ConversionTag::Uint32 | ConversionTag::Int32 => Some(4),
            ConversionTag::Uint64 | ConversionTag::Int64 => Some(8),
            ConversionTag::RawBytes => None,
        }
    }

    /// Signedness the catalogue entry must declare, `None` for raw bytes.
    pub const fn signedness(&self) -> Option<Signedness> {
        match self {
            ConversionTag::Bool
            | ConversionTag::Uint8
            | ConversionTag::Uint16
            | ConversionTag::Uint32
            | ConversionTag::Uint64 => Some(Signedness::Unsigned),
            ConversionTag::Int8 | ConversionTag::Int16 | ConversionTag::Int32 | ConversionTag::Int64 => {
                Some(Signedness::Signed)
            }
            ConversionTag::RawBytes => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signedness {
    Unsigned,
    Signed,
}

/// Catalogue entry for one IO element identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Declared value width in bytes.
    pub bytes: u16,
    #[serde(default)]
    pub signedness: Option<Signedness>,
    pub conversion: ConversionTag,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

/// Device families with their own element numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceFamily {
    #[serde(rename = "FMBXY")]
    Fmbxy,
    #[serde(rename = "FM64")]
    Fm64,
    #[serde(rename = "FM36")]
    Fm36,
    #[serde(rename = "FM11XY")]
    Fm11xy,
}

impl DeviceFamily {
    /// Order in which families are tried when the device family is unknown.
    pub const FALLBACK_ORDER: [DeviceFamily; 4] =
        [DeviceFamily::Fmbxy, DeviceFamily::Fm64, DeviceFamily::Fm36, DeviceFamily::Fm11xy];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceFamily::Fmbxy => "FMBXY",
            DeviceFamily::Fm64 => "FM64",
            DeviceFamily::Fm36 => "FM36",
            DeviceFamily::Fm11xy => "FM11XY",
        }
    }
}

impl std::fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceFamily {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        DeviceFamily::FALLBACK_ORDER
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CodecError::PropertyTable { details: format!("unknown device family '{s}'") })
    }
}

/// One YAML document: a family and its entries keyed by element id.
#[derive(Debug, Deserialize)]
struct FamilyCatalogue {
    family: DeviceFamily,
    properties: BTreeMap<u16, PropertyDescriptor>,
}

/// Element catalogues for one or more device families.
///
/// Built once and shared by reference; nothing mutates it after loading.
///
/// ```rust
/// use avlcodec::human::{DeviceFamily, PropertyTable};
///
/// let table = PropertyTable::bundled().unwrap();
/// let voltage = table.get(DeviceFamily::Fm11xy, 66).unwrap();
/// assert_eq!(voltage.name, "External Power Voltage");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    families: HashMap<DeviceFamily, BTreeMap<u16, PropertyDescriptor>>,
}

impl PropertyTable {
    /// Parse catalogues from YAML. Each document (separated by `---`)
    /// describes one family.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut families = HashMap::new();
        for document in serde_yaml_ng::Deserializer::from_str(yaml) {
            let catalogue = FamilyCatalogue::deserialize(document)
                .map_err(|e| CodecError::PropertyTable { details: e.to_string() })?;
            debug!("Loaded {} entries for {}", catalogue.properties.len(), catalogue.family);
            if families.insert(catalogue.family, catalogue.properties).is_some() {
                return Err(CodecError::PropertyTable {
                    details: format!("family {} catalogued twice", catalogue.family),
                });
            }
        }

        if families.is_empty() {
            return Err(CodecError::PropertyTable { details: "no family catalogue found".to_string() });
        }
        Ok(Self { families })
    }

    /// Read catalogues from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Catalogues compiled into the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_yaml_str(BUNDLED_FM11XY)
    }

    pub fn get(&self, family: DeviceFamily, id: u16) -> Option<&PropertyDescriptor> {
        self.families.get(&family)?.get(&id)
    }

    pub fn contains_family(&self, family: DeviceFamily) -> bool {
        self.families.contains_key(&family)
    }

    /// Loaded families in fallback order.
    pub fn families(&self) -> impl Iterator<Item = DeviceFamily> + '_ {
        DeviceFamily::FALLBACK_ORDER.into_iter().filter(|family| self.contains_family(*family))
    }

    /// Number of catalogued elements for `family`.
    pub fn len(&self, family: DeviceFamily) -> usize {
        self.families.get(&family).map_or(0, BTreeMap::len)
    }
}
