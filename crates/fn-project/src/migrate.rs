//! Schema migration framework.

use fn_nodes::formula::AMBIENT_TEMPERATURE;

use crate::ProjectError;
use crate::schema::{NetworkFile, NodeKindDef};

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut file: NetworkFile) -> Result<NetworkFile, ProjectError> {
    while file.version < LATEST_VERSION {
        file = migrate_one_version(file)?;
    }
    Ok(file)
}

fn migrate_one_version(file: NetworkFile) -> Result<NetworkFile, ProjectError> {
    match file.version {
        1 => migrate_v1_to_v2(file),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 1 saved topology only. Buffers start from ambient, as a freshly
/// created one would; port values stay absent and load as defaults.
fn migrate_v1_to_v2(mut file: NetworkFile) -> Result<NetworkFile, ProjectError> {
    for node in &mut file.nodes {
        if let NodeKindDef::Buffer {
            internal_quantity, ..
        } = &mut node.kind
        {
            internal_quantity.get_or_insert(AMBIENT_TEMPERATURE);
        }
    }
    file.version = 2;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeDef;

    fn file(version: u32, nodes: Vec<NodeDef>) -> NetworkFile {
        NetworkFile {
            version,
            name: "test".to_string(),
            nodes,
            flow_links: vec![],
            logic_links: vec![],
        }
    }

    #[test]
    fn migrate_latest_is_noop() {
        let f = file(LATEST_VERSION, vec![]);
        let migrated = migrate_to_latest(f.clone()).unwrap();
        assert_eq!(migrated, f);
    }

    #[test]
    fn migrate_v1_fills_buffer_state() {
        let f = file(
            1,
            vec![NodeDef {
                name: "Tank".to_string(),
                position: [0.0, 0.0],
                kind: NodeKindDef::Buffer {
                    max_quantity: 100.0,
                    capacity: 10.0,
                    internal_quantity: None,
                },
                ports: None,
            }],
        );

        let migrated = migrate_to_latest(f).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        match migrated.nodes[0].kind {
            NodeKindDef::Buffer {
                internal_quantity, ..
            } => assert_eq!(internal_quantity, Some(AMBIENT_TEMPERATURE)),
            _ => panic!("buffer kind changed by migration"),
        }
    }

    #[test]
    fn version_zero_has_no_path() {
        assert!(matches!(
            migrate_to_latest(file(0, vec![])),
            Err(ProjectError::Migration { .. })
        ));
    }
}
