//! In-memory registration tree.

use std::time::Duration;

use schemasuite_core::registration::GroupBody;
use schemasuite_core::{Error, Registrar, TestFn, Variant};

use crate::config::HarnessOptions;

/// A registered group.
struct GroupNode {
    /// Label of the group.
    label: String,
    /// Registration variant.
    variant: Variant,
    /// Timeout applying to every leaf in the group.
    timeout: Option<Duration>,
    /// Nested groups and leaves, in registration order.
    children: Vec<Node>,
}

/// A registered leaf test.
struct LeafNode {
    /// Label of the test.
    label: String,
    /// Registration variant.
    variant: Variant,
    /// Body of the test.
    body: TestFn,
}

/// A node of the registration tree.
enum Node {
    /// A group.
    Group(GroupNode),
    /// A leaf test.
    Leaf(LeafNode),
}

impl Node {
    fn has_only(&self) -> bool {
        match self {
            Self::Group(group) => {
                group.variant == Variant::Only || group.children.iter().any(Self::has_only)
            }
            Self::Leaf(leaf) => leaf.variant == Variant::Only,
        }
    }
}

/// Records groups and leaves as they are registered.
#[derive(Default)]
pub struct TestTree {
    roots: Vec<Node>,
    open: Vec<GroupNode>,
}

/// A leaf test along with everything inherited from its ancestors.
pub struct PlannedTest {
    /// Labels of the enclosing groups, outermost first.
    pub path: Vec<String>,
    /// Label of the test.
    pub name: String,
    /// Whether the test was selected to run.
    pub selected: bool,
    /// The nearest ancestor timeout.
    pub timeout: Option<Duration>,
    /// Body of the test.
    pub body: TestFn,
}

impl PlannedTest {
    /// Returns the `::`-separated path and name of the test.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join("::")
    }
}

#[derive(Clone)]
struct Inherited {
    path: Vec<String>,
    skipped: bool,
    in_only: bool,
    timeout: Option<Duration>,
}

impl TestTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of leaves registered.
    pub fn leaf_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    Node::Group(group) => count(&group.children),
                    Node::Leaf(_) => 1,
                })
                .sum()
        }

        count(&self.roots)
    }

    /// Flattens the tree into its leaves, in registration order, deciding which
    /// of them run.
    ///
    /// `Skip` nodes skip their whole subtree. When any node is `Only`, just the
    /// leaves at or below an `Only` node are selected. Name filters from
    /// `options` then apply to the qualified names of the remaining leaves.
    pub fn into_plan(self, options: &HarnessOptions) -> Vec<PlannedTest> {
        let restrict_to_only = self.roots.iter().any(Node::has_only);
        let root = Inherited {
            path: vec![],
            skipped: false,
            in_only: false,
            timeout: None,
        };

        let mut plan = vec![];
        for node in self.roots {
            flatten(node, &root, restrict_to_only, options, &mut plan);
        }
        plan
    }

    fn attach(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }
}

fn flatten(
    node: Node,
    inherited: &Inherited,
    restrict_to_only: bool,
    options: &HarnessOptions,
    plan: &mut Vec<PlannedTest>,
) {
    match node {
        Node::Group(group) => {
            let mut nested = inherited.clone();
            nested.skipped |= group.variant == Variant::Skip;
            nested.in_only |= group.variant == Variant::Only;
            nested.timeout = group.timeout.or(inherited.timeout);
            nested.path.push(group.label);

            for child in group.children {
                flatten(child, &nested, restrict_to_only, options, plan);
            }
        }
        Node::Leaf(leaf) => {
            let skipped = inherited.skipped || leaf.variant == Variant::Skip;
            let in_only = inherited.in_only || leaf.variant == Variant::Only;

            let mut planned = PlannedTest {
                path: inherited.path.clone(),
                name: leaf.label,
                selected: false,
                timeout: inherited.timeout,
                body: leaf.body,
            };

            planned.selected = !skipped
                && (!restrict_to_only || in_only)
                && options.should_run_test(&planned.qualified_name());

            plan.push(planned);
        }
    }
}

impl Registrar for TestTree {
    fn group(
        &mut self,
        variant: Variant,
        label: &str,
        timeout: Option<Duration>,
        body: &mut GroupBody<'_>,
    ) -> Result<(), Error> {
        self.open.push(GroupNode {
            label: label.to_owned(),
            variant,
            timeout,
            children: vec![],
        });

        let result = body(self);

        if let Some(group) = self.open.pop() {
            self.attach(Node::Group(group));
        }

        result
    }

    fn test(&mut self, variant: Variant, label: &str, body: TestFn) {
        self.attach(Node::Leaf(LeafNode {
            label: label.to_owned(),
            variant,
            body,
        }));
    }
}
