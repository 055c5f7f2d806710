//! Category remapping between COCO ids and YOLO class indices.
//!
//! YOLO label files carry zero-based contiguous class indices that must
//! line up positionally with the class-name list the training engine is
//! given. This module owns that contract: the mapping is an explicit,
//! ordered structure built once per run, persisted as `classes.txt` and
//! as the `names:` block of `data.yaml`, never an incidental insertion
//! order.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;

use crate::coco::CocoDataset;
use crate::error::PrepError;

/// The ordered COCO-id to YOLO-index remapping.
#[derive(Clone, Debug, Default)]
pub struct ClassMap {
    names: Vec<String>,
    by_coco_id: BTreeMap<u64, usize>,
}

impl ClassMap {
    /// Builds the map from the dataset itself.
    ///
    /// The distinct category ids referenced by annotations are sorted
    /// ascending and assigned indices 0..n. Names come from the
    /// `categories` list when present, otherwise `class_<id>`. Declared
    /// but unreferenced categories do not occupy an index.
    pub fn from_coco(coco: &CocoDataset) -> Self {
        let declared_names: BTreeMap<u64, &str> = coco
            .categories
            .iter()
            .map(|cat| (cat.id, cat.name.as_str()))
            .collect();

        let mut referenced: Vec<u64> = coco.annotations.iter().map(|ann| ann.category_id).collect();
        referenced.sort_unstable();
        referenced.dedup();

        let mut names = Vec::with_capacity(referenced.len());
        let mut by_coco_id = BTreeMap::new();

        for (index, coco_id) in referenced.into_iter().enumerate() {
            let name = declared_names
                .get(&coco_id)
                .map(|name| (*name).to_string())
                .unwrap_or_else(|| format!("class_{}", coco_id));
            names.push(name);
            by_coco_id.insert(coco_id, index);
        }

        Self { names, by_coco_id }
    }

    /// Builds the map from a user-supplied ordered name list.
    ///
    /// Indices are the list positions. COCO ids resolve through the
    /// dataset's `categories` names; ids whose name is not listed get no
    /// index, and the converter skips their annotations.
    pub fn from_name_list(names: Vec<String>, coco: &CocoDataset) -> Result<Self, PrepError> {
        if names.is_empty() {
            return Err(PrepError::InvalidConfig {
                message: "class list must contain at least one name".to_string(),
            });
        }

        let mut by_coco_id = BTreeMap::new();
        for cat in &coco.categories {
            if let Some(index) = names.iter().position(|name| *name == cat.name) {
                by_coco_id.insert(cat.id, index);
            }
        }

        Ok(Self { names, by_coco_id })
    }

    /// The YOLO index for a COCO category id, if it has one.
    pub fn index_of(&self, coco_id: u64) -> Option<usize> {
        self.by_coco_id.get(&coco_id).copied()
    }

    /// Class names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Writes `classes.txt`: one name per line, index = line number.
    pub fn write_classes_txt(&self, path: &Path) -> Result<(), PrepError> {
        let mut file = fs::File::create(path).map_err(PrepError::Io)?;
        for name in &self.names {
            writeln!(file, "{}", name).map_err(PrepError::Io)?;
        }
        Ok(())
    }

    /// Renders the `names:` block used in `data.yaml`.
    pub fn data_yaml_names(&self) -> String {
        let mut yaml = String::from("names:\n");
        for (index, name) in self.names.iter().enumerate() {
            yaml.push_str(&format!("  {}: {}\n", index, yaml_single_quoted(name)));
        }
        yaml
    }

    /// Writes `<dataset_root>/data.yaml` for the split layout the training
    /// engine consumes: the absolute dataset path, the three image
    /// directories, and the positional class names.
    pub fn write_data_yaml(&self, dataset_root: &Path) -> Result<(), PrepError> {
        let absolute = fs::canonicalize(dataset_root).map_err(PrepError::Io)?;

        let mut yaml = format!(
            "path: {}\ntrain: images/train\nval: images/val\ntest: images/test\n\n",
            absolute.display()
        );
        yaml.push_str(&self.data_yaml_names());

        fs::write(dataset_root.join("data.yaml"), yaml).map_err(PrepError::Io)
    }
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

#[derive(Debug, Deserialize)]
struct ClassYaml {
    names: ClassYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

/// Loads an ordered class-name list from a user-supplied file.
///
/// `.yaml`/`.yml` files are parsed for a `names:` key (sequence or
/// index mapping, the two shapes `data.yaml` appears in); anything else
/// is read as `classes.txt` with one name per line.
pub fn load_class_names(path: &Path) -> Result<Vec<String>, PrepError> {
    let data = fs::read_to_string(path).map_err(PrepError::Io)?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        let parsed: ClassYaml =
            serde_yaml::from_str(&data).map_err(|source| PrepError::ClassFileParse {
                path: path.to_path_buf(),
                message: source.to_string(),
            })?;

        let names = match parsed.names {
            ClassYamlNames::Sequence(names) => names,
            ClassYamlNames::Mapping(mapping) => {
                if mapping.is_empty() {
                    Vec::new()
                } else {
                    let max_index = *mapping.keys().max().expect("checked non-empty");
                    let mut names = vec![String::new(); max_index + 1];
                    for (index, name) in mapping {
                        names[index] = name;
                    }
                    for (index, name) in names.iter_mut().enumerate() {
                        if name.trim().is_empty() {
                            *name = format!("class_{}", index);
                        }
                    }
                    names
                }
            }
        };

        return Ok(names);
    }

    let mut names = Vec::new();
    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(PrepError::ClassFileParse {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}
