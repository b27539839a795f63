//! Resolution pipeline: reads data files, resolves cross-references, builds
//! the catalog and objective list.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by [`load_content`] and by the embedded
//! built-in content.

use crate::schema::{ElementData, ObjectiveData, ReactionData};
use reaction_lab_core::catalog::{
    Catalog, CatalogBuilder, CatalogError, ElementDef, MolecularStructure, ReactionDef,
    StructureAtom, StructureBond,
};
use reaction_lab_core::id::{ElementId, ReactionId};
use reaction_lab_objectives::{Objective, ObjectiveId, ObjectiveKind, ObjectiveStep};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An id reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate id was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// An objective is neither simple nor multistep, or both.
    #[error("objective '{id}' in {file}: {detail}")]
    InvalidObjective {
        file: PathBuf,
        id: String,
        detail: &'static str,
    },

    /// The resolved content failed catalog validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(origin: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Deserialize text in the given format. `origin` is only used in errors.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(origin, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(origin, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(origin, e)),
    }
}

/// Deserialize a list from text. For TOML, extracts the array at `toml_key`
/// from a top-level table; RON and JSON hold the list directly.
pub fn parse_list<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if format != Format::Toml {
        return parse_str(content, format, origin);
    }
    let table: toml::Value = toml::from_str(content).map_err(|e| parse_error(origin, e))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| DataLoadError::Parse {
            file: origin.to_path_buf(),
            detail: format!("missing key '{toml_key}' in TOML file"),
        })?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(origin, e))
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

/// Read a list file. See [`parse_list`] for the TOML layout.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_list(&content, format, path, toml_key)
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Content pack
// ===========================================================================

/// Fully resolved sandbox content.
#[derive(Debug, Clone)]
pub struct ContentPack {
    pub catalog: Catalog,
    pub objectives: Vec<Objective>,
}

/// Parsed but unresolved content, with the origin of each list for errors.
#[derive(Debug, Clone)]
pub struct RawContent {
    pub elements: Vec<ElementData>,
    pub elements_origin: PathBuf,
    pub reactions: Vec<ReactionData>,
    pub reactions_origin: PathBuf,
    /// `None` falls back to the generated default objectives.
    pub objectives: Option<(Vec<ObjectiveData>, PathBuf)>,
}

/// Load content from a directory.
///
/// `elements` and `reactions` are required; `objectives` is optional and
/// defaults to [`crate::default_objectives`]. Each may be `.ron`, `.json`
/// or `.toml`.
pub fn load_content(dir: &Path) -> Result<ContentPack, DataLoadError> {
    let elements_origin = require_data_file(dir, "elements")?;
    let reactions_origin = require_data_file(dir, "reactions")?;
    let elements = deserialize_list(&elements_origin, "elements")?;
    let reactions = deserialize_list(&reactions_origin, "reactions")?;

    let objectives = match find_data_file(dir, "objectives")? {
        Some(path) => Some((deserialize_list(&path, "objectives")?, path)),
        None => None,
    };

    resolve_content(RawContent {
        elements,
        elements_origin,
        reactions,
        reactions_origin,
        objectives,
    })
}

/// Resolve parsed content into a catalog and objective list.
pub fn resolve_content(raw: RawContent) -> Result<ContentPack, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    let mut names: HashMap<String, ElementId> = HashMap::new();

    for data in raw.elements {
        check_duplicate(&names, &data.id, &raw.elements_origin)?;
        let def = resolve_element(data);
        names.insert(def.id.as_str().to_string(), def.id.clone());
        builder.register_element(def)?;
    }

    let mut reaction_names: HashMap<String, usize> = HashMap::new();
    for (index, data) in raw.reactions.into_iter().enumerate() {
        check_duplicate(&reaction_names, &data.id, &raw.reactions_origin)?;
        reaction_names.insert(data.id.clone(), index);
        let def = resolve_reaction(data, &names, &raw.reactions_origin)?;
        builder.register_reaction(def)?;
    }
    let catalog = builder.build()?;

    let objectives = match raw.objectives {
        Some((list, origin)) => list
            .into_iter()
            .map(|data| resolve_objective(data, &names, &origin))
            .collect::<Result<Vec<_>, _>>()?,
        None => crate::builtin::default_objectives(),
    };

    tracing::info!(
        target: "lab.data",
        elements = catalog.element_count(),
        reactions = catalog.reaction_count(),
        objectives = objectives.len(),
        "content resolved"
    );

    Ok(ContentPack {
        catalog,
        objectives,
    })
}

fn resolve_element(data: ElementData) -> ElementDef {
    let symbol = if data.symbol.is_empty() {
        data.id.clone()
    } else {
        data.symbol
    };
    ElementDef {
        id: ElementId::new(data.id),
        name: data.name,
        atomic_number: data.atomic_number,
        symbol,
        category: data.category,
        state: data.state,
        color: data.color,
        description: data.description,
        default_unlocked: data.unlocked,
        structure: data.structure.map(|s| MolecularStructure {
            atoms: s
                .atoms
                .into_iter()
                .map(|a| StructureAtom {
                    element: a.element,
                    x: a.x,
                    y: a.y,
                    bonds: a
                        .bonds
                        .into_iter()
                        .map(|b| StructureBond {
                            to: b.to,
                            order: b.order,
                        })
                        .collect(),
                })
                .collect(),
            show_hydrogens: s.show_hydrogens,
        }),
    }
}

fn resolve_reaction(
    data: ReactionData,
    names: &HashMap<String, ElementId>,
    file: &Path,
) -> Result<ReactionDef, DataLoadError> {
    let mut inputs = std::collections::BTreeMap::new();
    for (name, count) in &data.inputs {
        let id = resolve_name(names, name, file, "element")?;
        inputs.insert(id.clone(), *count);
    }
    let output = resolve_name(names, &data.output, file, "element")?.clone();

    Ok(ReactionDef {
        id: ReactionId::new(data.id),
        inputs,
        output,
        output_count: data.output_count,
        equation: data.equation,
        description: data.description,
        condition: data.condition,
    })
}

fn resolve_objective(
    data: ObjectiveData,
    names: &HashMap<String, ElementId>,
    file: &Path,
) -> Result<Objective, DataLoadError> {
    let id = data
        .id
        .map(ObjectiveId::new)
        .unwrap_or_else(|| ObjectiveId::for_slot(data.tier, data.order));
    let invalid = |detail| DataLoadError::InvalidObjective {
        file: file.to_path_buf(),
        id: id.to_string(),
        detail,
    };

    let kind = match (data.target_compound, data.steps.is_empty()) {
        (Some(target), true) => ObjectiveKind::Simple {
            target_compound: resolve_name(names, &target, file, "compound")?.clone(),
        },
        (None, false) => {
            let mut steps = Vec::with_capacity(data.steps.len());
            for (i, step) in data.steps.into_iter().enumerate() {
                let required_elements = step
                    .required_elements
                    .iter()
                    .map(|name| resolve_name(names, name, file, "element").cloned())
                    .collect::<Result<Vec<_>, _>>()?;
                steps.push(ObjectiveStep {
                    step_number: step.step_number.unwrap_or(i as u32 + 1),
                    description: step.description,
                    required_elements,
                });
            }
            ObjectiveKind::Multistep { steps }
        }
        (Some(_), false) => return Err(invalid("has both a target compound and steps")),
        (None, true) => return Err(invalid("needs a target compound or steps")),
    };

    Ok(Objective {
        id,
        tier: data.tier,
        order: data.order,
        title: data.title,
        description: data.description,
        kind,
        requires_bonds: data.requires_bonds,
        reward: data.reward,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ElementData;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "reaction_lab_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const ELEMENTS_RON: &str = r#"[
        (id: "H", name: "Hydrogen", atomic_number: 1, state: Gas, unlocked: true),
        (id: "O", name: "Oxygen", atomic_number: 8, state: Gas, unlocked: true),
        (id: "H2O", name: "Water", symbol: "H₂O"),
    ]"#;

    const REACTIONS_RON: &str = r#"[
        (id: "rxn_0", inputs: {"H": 2, "O": 1}, output: "H2O", equation: "2H₂ + O₂ → 2H₂O"),
    ]"#;

    fn write_basic(dir: &Path) {
        fs::write(dir.join("elements.ron"), ELEMENTS_RON).unwrap();
        fs::write(dir.join("reactions.ron"), REACTIONS_RON).unwrap();
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["elements.yaml", "elements"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // find_data_file / require_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        fs::write(dir.join("reactions.json"), "[]").unwrap();

        assert_eq!(
            find_data_file(&dir, "reactions").unwrap(),
            Some(dir.join("reactions.json"))
        );
        assert_eq!(find_data_file(&dir, "objectives").unwrap(), None);

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("elements.ron"), "[]").unwrap();
        fs::write(dir.join("elements.json"), "[]").unwrap();

        assert!(matches!(
            find_data_file(&dir, "elements"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");
        let result = require_data_file(&dir, "elements");
        assert!(matches!(
            result,
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "elements"
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_ron_json_toml() {
        let dir = make_test_dir("list_formats");

        let ron_path = dir.join("a.ron");
        fs::write(&ron_path, r#"[(id: "H", name: "Hydrogen")]"#).unwrap();
        let list: Vec<ElementData> = deserialize_list(&ron_path, "elements").unwrap();
        assert_eq!(list[0].id, "H");

        let json_path = dir.join("b.json");
        fs::write(&json_path, r#"[{"id": "O", "name": "Oxygen"}]"#).unwrap();
        let list: Vec<ElementData> = deserialize_list(&json_path, "elements").unwrap();
        assert_eq!(list[0].id, "O");

        let toml_path = dir.join("c.toml");
        fs::write(
            &toml_path,
            r#"
[[elements]]
id = "C"
name = "Carbon"
"#,
        )
        .unwrap();
        let list: Vec<ElementData> = deserialize_list(&toml_path, "elements").unwrap();
        assert_eq!(list[0].id, "C");

        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        let path = dir.join("elements.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        let result: Result<Vec<ElementData>, _> = deserialize_list(&path, "elements");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Vec<ElementData>, _> = deserialize_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // resolve_name / check_duplicate
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_name_missing() {
        let map: HashMap<String, u32> = HashMap::new();
        let result = resolve_name(&map, "Xe", Path::new("reactions.ron"), "element");
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "element", .. }) if name == "Xe"
        ));
    }

    #[test]
    fn check_duplicate_has_dup() {
        let mut map = HashMap::new();
        map.insert("H".to_string(), 1u32);
        assert!(check_duplicate(&map, "O", Path::new("elements.ron")).is_ok());
        assert!(matches!(
            check_duplicate(&map, "H", Path::new("elements.ron")),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "H"
        ));
    }

    // -----------------------------------------------------------------------
    // load_content
    // -----------------------------------------------------------------------

    #[test]
    fn load_content_resolves_catalog_and_defaults_objectives() {
        let dir = make_test_dir("load_basic");
        write_basic(&dir);

        let pack = load_content(&dir).unwrap();
        assert_eq!(pack.catalog.element_count(), 3);
        assert_eq!(pack.catalog.reaction_count(), 1);

        let water = pack.catalog.element(&ElementId::from("H2O")).unwrap();
        assert_eq!(water.symbol, "H₂O");
        assert!(!water.default_unlocked);
        let hydrogen = pack.catalog.element(&ElementId::from("H")).unwrap();
        assert_eq!(hydrogen.symbol, "H");

        assert!(!pack.objectives.is_empty());

        cleanup(&dir);
    }

    #[test]
    fn load_content_unresolved_reaction_input() {
        let dir = make_test_dir("load_unresolved");
        fs::write(dir.join("elements.ron"), ELEMENTS_RON).unwrap();
        fs::write(
            dir.join("reactions.ron"),
            r#"[(id: "rxn_x", inputs: {"Xe": 1}, output: "H2O")]"#,
        )
        .unwrap();

        let result = load_content(&dir);
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, .. }) if name == "Xe"
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_content_duplicate_element() {
        let dir = make_test_dir("load_dup");
        fs::write(
            dir.join("elements.json"),
            r#"[{"id": "H", "name": "Hydrogen"}, {"id": "H", "name": "Again"}]"#,
        )
        .unwrap();
        fs::write(dir.join("reactions.json"), "[]").unwrap();

        assert!(matches!(
            load_content(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "H"
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_content_duplicate_reaction_key_surfaces_catalog_error() {
        let dir = make_test_dir("load_dup_key");
        fs::write(dir.join("elements.ron"), ELEMENTS_RON).unwrap();
        fs::write(
            dir.join("reactions.ron"),
            r#"[
                (id: "a", inputs: {"H": 2, "O": 1}, output: "H2O"),
                (id: "b", inputs: {"O": 1, "H": 2}, output: "H2O"),
            ]"#,
        )
        .unwrap();

        assert!(matches!(
            load_content(&dir),
            Err(DataLoadError::Catalog(CatalogError::DuplicateKey { .. }))
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_content_with_toml_objectives() {
        let dir = make_test_dir("load_objectives");
        write_basic(&dir);
        fs::write(
            dir.join("objectives.toml"),
            r#"
[[objectives]]
tier = 1
order = 1
title = "First Drop"
target_compound = "H2O"

[[objectives]]
id = "wire_water"
tier = 1
order = 2
title = "Wire It"
requires_bonds = true

[[objectives.steps]]
description = "Bond two hydrogens to an oxygen"
required_elements = ["H", "O"]
"#,
        )
        .unwrap();

        let pack = load_content(&dir).unwrap();
        assert_eq!(pack.objectives.len(), 2);
        assert_eq!(pack.objectives[0].id.as_str(), "t1_obj1");
        assert!(matches!(
            &pack.objectives[0].kind,
            ObjectiveKind::Simple { target_compound } if target_compound.as_str() == "H2O"
        ));
        assert_eq!(pack.objectives[1].id.as_str(), "wire_water");
        let ObjectiveKind::Multistep { steps } = &pack.objectives[1].kind else {
            panic!("expected multistep");
        };
        assert_eq!(steps[0].step_number, 1);
        assert_eq!(steps[0].required_elements.len(), 2);

        cleanup(&dir);
    }

    #[test]
    fn objective_without_goal_is_rejected() {
        let dir = make_test_dir("load_bad_objective");
        write_basic(&dir);
        fs::write(
            dir.join("objectives.json"),
            r#"[{"tier": 1, "order": 1, "title": "Nothing"}]"#,
        )
        .unwrap();

        assert!(matches!(
            load_content(&dir),
            Err(DataLoadError::InvalidObjective { ref id, .. }) if id == "t1_obj1"
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "elements".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(format!("{e}").contains("elements"));
        assert!(format!("{e}").contains("/data"));

        let e = DataLoadError::UnresolvedRef {
            file: PathBuf::from("reactions.ron"),
            name: "Xe".to_string(),
            expected_kind: "element",
        };
        let msg = format!("{e}");
        assert!(msg.contains("Xe"));
        assert!(msg.contains("element"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(format!("{data_err}").contains("file not found"));
    }
}
