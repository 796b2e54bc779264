//! Level organization of fetch paths.
//!
//! Paths are processed strictly in ascending depth order so parents are
//! always materialized before their dependents are queried. Within a level,
//! encounter order is preserved; paths at the same depth are independent.

use crate::fetch::{FetchPath, PathId};

/// Group fetch paths by depth, ascending.
///
/// Each inner list preserves the relative order the paths were encountered
/// in. The result has one entry per depth from 0 to the maximum.
#[must_use]
pub fn organize_by_level(paths: &[FetchPath]) -> Vec<Vec<PathId>> {
    let Some(max_depth) = paths.iter().map(|p| p.depth).max() else {
        return Vec::new();
    };

    let mut levels = vec![Vec::new(); max_depth + 1];
    for path in paths {
        levels[path.depth].push(path.id);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QuerySpec;
    use splitfetch_core::{EntityType, FieldInfo, NavigationInfo, NavigationKind};

    static LEAF_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("branch_id", "branch_id"),
    ];
    static LEAF: EntityType = EntityType::new("LLeaf", "leaves", LEAF_FIELDS, &[]);

    fn leaf_type() -> &'static EntityType {
        &LEAF
    }

    static BRANCH_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("tree_id", "tree_id"),
    ];
    static BRANCH_NAVS: &[NavigationInfo] =
        &[NavigationInfo::new("leaves", NavigationKind::Collection, leaf_type)
            .foreign_key(&["branch_id"])];
    static BRANCH: EntityType = EntityType::new("LBranch", "branches", BRANCH_FIELDS, BRANCH_NAVS);

    fn branch_type() -> &'static EntityType {
        &BRANCH
    }

    static TREE_FIELDS: &[FieldInfo] = &[FieldInfo::new("id", "id").primary_key(true)];
    static TREE_NAVS: &[NavigationInfo] = &[
        NavigationInfo::new("branches", NavigationKind::Collection, branch_type)
            .foreign_key(&["tree_id"]),
        NavigationInfo::new("dead_branches", NavigationKind::Collection, branch_type)
            .foreign_key(&["tree_id"]),
    ];
    static TREE: EntityType = EntityType::new("LTree", "trees", TREE_FIELDS, TREE_NAVS);

    #[test]
    fn test_levels_ascend_and_preserve_order() {
        let q = QuerySpec::source(&TREE)
            .fetch("branches")
            .then_fetch("leaves")
            .fetch("dead_branches");
        let paths = crate::fetch::extract_fetch_paths(&q).unwrap();
        let levels = organize_by_level(&paths);

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], vec![0, 2]);
        assert_eq!(levels[1], vec![1]);
    }

    #[test]
    fn test_empty_forest() {
        assert!(organize_by_level(&[]).is_empty());
    }
}
