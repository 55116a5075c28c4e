use std::collections::BTreeMap;

use sc_api::{MemoryStage, ObjectId, ScriptError, Vec2};
use serde::{Deserialize, Serialize};

use crate::map_cli_stage_invalid;

pub(crate) const STAGE_SPEC_SCHEMA: &str = "stage.v1";

/// On-disk description of a scene the runner can play against: a flat list
/// of objects (parents referenced by name, declared first), motion curves,
/// spawnable template names and the command names the stage provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StageSpec {
    pub(crate) schema_version: String,
    #[serde(default)]
    pub(crate) objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub(crate) curves: BTreeMap<String, Vec<[f32; 2]>>,
    #[serde(default)]
    pub(crate) templates: Vec<String>,
    #[serde(default)]
    pub(crate) commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectSpec {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) parent: Option<String>,
    #[serde(default)]
    pub(crate) position: Option<[f32; 2]>,
    #[serde(default = "enabled_default")]
    pub(crate) enabled: bool,
    #[serde(default)]
    pub(crate) animations: Vec<String>,
}

fn enabled_default() -> bool {
    true
}

pub(crate) fn parse_stage_spec(raw: &str) -> Result<StageSpec, ScriptError> {
    let spec: StageSpec = serde_json::from_str(raw).map_err(map_cli_stage_invalid)?;
    if spec.schema_version != STAGE_SPEC_SCHEMA {
        return Err(ScriptError::new(
            "CLI_STAGE_SCHEMA",
            format!("Unsupported stage schema: {}", spec.schema_version),
        ));
    }
    Ok(spec)
}

pub(crate) fn build_stage(spec: &StageSpec) -> Result<MemoryStage, ScriptError> {
    let mut stage = MemoryStage::new();
    let mut by_name: BTreeMap<&str, ObjectId> = BTreeMap::new();

    for object in &spec.objects {
        let parent = match &object.parent {
            Some(parent) => *by_name.get(parent.as_str()).ok_or_else(|| {
                ScriptError::new(
                    "CLI_STAGE_PARENT",
                    format!(
                        "object \"{}\" references parent \"{}\" before it is declared.",
                        object.name, parent
                    ),
                )
            })?,
            None => stage.root(),
        };
        let id = stage.add_object(parent, &object.name);
        if let Some([x, y]) = object.position {
            stage.place(id, Vec2::new(x, y));
        }
        if !object.enabled {
            stage.enable(id, false);
        }
        for state in &object.animations {
            stage.allow_animation(id, state);
        }
        // First declaration of a name wins for later parent lookups.
        by_name.entry(object.name.as_str()).or_insert(id);
    }

    for (name, points) in &spec.curves {
        stage.add_curve(
            name,
            points.iter().map(|[x, y]| Vec2::new(*x, *y)).collect(),
        );
    }
    for template in &spec.templates {
        stage.add_template(template);
    }

    Ok(stage)
}
