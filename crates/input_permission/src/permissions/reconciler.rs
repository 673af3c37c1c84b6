//! Translation of symbolic defaults into permission-tree edges.

use std::sync::Arc;
use tracing::{debug, info};

use crate::category::PermissionCategory;
use crate::error::InputPermissionError;
use crate::host::{PermissionEngine, PermissionNode};
use crate::permissions::{DefaultPolicy, PermissionNames, SymbolicDefault};

/// One of the two root groups the reconciler edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionGroup {
    /// Granted to every player
    Everyone,
    /// Granted to operators; operators also hold everything in `Everyone`
    Operators,
}

impl PermissionGroup {
    /// Name of the group's node in the host permission tree
    pub fn node_name(self) -> &'static str {
        match self {
            PermissionGroup::Everyone => "pocketmine.group.user",
            PermissionGroup::Operators => "pocketmine.group.operator",
        }
    }
}

/// Desired edges from the two groups to a permission
///
/// `Some(granted)` means the group has a child edge with that value,
/// `None` means the group has no edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEdges {
    /// Edge from the everyone group
    pub everyone: Option<bool>,
    /// Edge from the operators group
    pub operators: Option<bool>,
}

impl GroupEdges {
    /// Edge for one group
    pub fn get(self, group: PermissionGroup) -> Option<bool> {
        match group {
            PermissionGroup::Everyone => self.everyone,
            PermissionGroup::Operators => self.operators,
        }
    }
}

/// Permission-tree shape for every default
const EDGE_TABLE: [(SymbolicDefault, GroupEdges); 4] = [
    (
        SymbolicDefault::True,
        GroupEdges {
            everyone: Some(true),
            operators: None,
        },
    ),
    (
        SymbolicDefault::Op,
        GroupEdges {
            everyone: None,
            operators: Some(true),
        },
    ),
    (
        SymbolicDefault::NotOp,
        GroupEdges {
            everyone: Some(true),
            operators: Some(false),
        },
    ),
    (
        SymbolicDefault::False,
        GroupEdges {
            everyone: None,
            operators: None,
        },
    ),
];

impl SymbolicDefault {
    /// Group edges this default produces
    ///
    /// # Examples
    ///
    /// ```
    /// use input_permission::SymbolicDefault;
    ///
    /// let edges = SymbolicDefault::NotOp.edges();
    /// assert_eq!(edges.everyone, Some(true));
    /// assert_eq!(edges.operators, Some(false));
    /// ```
    pub fn edges(self) -> GroupEdges {
        EDGE_TABLE
            .iter()
            .find(|(default, _)| *default == self)
            .map(|(_, edges)| *edges)
            .unwrap_or(GroupEdges {
                everyone: None,
                operators: None,
            })
    }

    /// Default that produced the given edges, if any
    pub fn from_edges(edges: GroupEdges) -> Option<SymbolicDefault> {
        EDGE_TABLE
            .iter()
            .find(|(_, candidate)| *candidate == edges)
            .map(|(default, _)| *default)
    }
}

/// Applies symbolic defaults to the host permission tree
///
/// # Example
///
/// ```
/// # #[cfg(feature = "testing")]
/// # {
/// use input_permission::permissions::{PermissionGroup, PermissionNames, PolicyReconciler};
/// use input_permission::testing::MemoryPermissionEngine;
/// use input_permission::SymbolicDefault;
/// use std::sync::Arc;
///
/// let engine = Arc::new(MemoryPermissionEngine::new());
/// let reconciler = PolicyReconciler::new(engine.clone(), PermissionNames::new("inputpermission"));
///
/// reconciler.apply("inputpermission.permission.jump", SymbolicDefault::Op).unwrap();
/// assert_eq!(
///     engine.edge(PermissionGroup::Operators, "inputpermission.permission.jump"),
///     Some(true)
/// );
/// # }
/// ```
#[derive(Clone)]
pub struct PolicyReconciler {
    engine: Arc<dyn PermissionEngine>,
    names: PermissionNames,
}

impl PolicyReconciler {
    /// Create a reconciler over a permission engine
    pub fn new(engine: Arc<dyn PermissionEngine>, names: PermissionNames) -> Self {
        Self { engine, names }
    }

    fn group(&self, group: PermissionGroup) -> Result<Arc<dyn PermissionNode>, InputPermissionError> {
        self.engine
            .node(group.node_name())
            .ok_or_else(|| InputPermissionError::MissingPermissionNode {
                name: group.node_name().to_string(),
            })
    }

    /// Make the group edges of `permission` match `default`
    ///
    /// Idempotent: applying the same default twice leaves the same edges.
    pub fn apply(&self, permission: &str, default: SymbolicDefault) -> Result<(), InputPermissionError> {
        let edges = default.edges();
        // Both nodes must resolve before either edge is touched
        let nodes = [
            (PermissionGroup::Everyone, self.group(PermissionGroup::Everyone)?),
            (PermissionGroup::Operators, self.group(PermissionGroup::Operators)?),
        ];
        for (group, node) in nodes {
            match edges.get(group) {
                Some(granted) => node.add_child(permission, granted),
                None => node.remove_child(permission),
            }
        }
        debug!(permission, default = %default, "Applied permission default");
        Ok(())
    }

    /// Apply one category's default
    pub fn apply_category(
        &self,
        category: PermissionCategory,
        default: SymbolicDefault,
    ) -> Result<(), InputPermissionError> {
        self.apply(&self.names.category(category), default)
    }

    /// Apply every entry of a policy
    pub fn apply_policy(&self, policy: &DefaultPolicy) -> Result<(), InputPermissionError> {
        for (category, default) in policy.iter() {
            self.apply_category(category, default)?;
        }
        info!(namespace = self.names.namespace(), "Applied default input permissions");
        Ok(())
    }
}
