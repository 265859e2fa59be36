// tests/property_resolution.rs

use std::collections::{BTreeSet, HashMap};

use devpipe::dag::{Resolver, build_reverse_deps, resolve_deep};
use devpipe::project::MemoryProject;
use devpipe_test_utils::builders::{ComponentBuilder, ProjectBuilder};
use proptest::prelude::*;
use tokio::sync::mpsc;

// Component N may only depend on components 0..N-1, so the graph is acyclic.
fn acyclic_project_strategy(max_components: usize) -> impl Strategy<Value = MemoryProject> {
    (1..=max_components).prop_flat_map(|count| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..count), count)
            .prop_map(move |raw_deps| {
                let mut builder = ProjectBuilder::new();
                for (i, potential) in raw_deps.into_iter().enumerate() {
                    let deps: BTreeSet<String> = if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential.into_iter().map(|d| format!("c{}", d % i)).collect()
                    };
                    let deps: Vec<&str> = deps.iter().map(|d| d.as_str()).collect();
                    let name = format!("c{i}");
                    builder = builder.with(
                        ComponentBuilder::new(&name)
                            .depends("build", &deps)
                            .depends("checkout", &deps[..deps.len().min(1)]),
                    );
                }
                builder.build()
            })
    })
}

fn tasks_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop_oneof![
        Just(vec!["build"]),
        Just(vec!["checkout", "build"]),
        Just(vec!["checkout", "build", "install"]),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn all_success_run_visits_every_node_once_in_order(
        project in acyclic_project_strategy(8),
        tasks in tasks_strategy(),
    ) {
        let targets: Vec<String> = (0..project.len()).map(|i| format!("c{i}")).collect();
        let graph = build_reverse_deps(&project, &targets, &tasks).unwrap();
        let resolver = resolve_deep(&project, &targets, &tasks).unwrap();

        let (tx, mut rx) = mpsc::channel(1);
        resolver.resolve(tx).unwrap();

        let mut released_at: HashMap<String, usize> = HashMap::new();
        let mut completed_at: HashMap<String, usize> = HashMap::new();
        let mut clock = 0;
        while let Some(batch) = rx.blocking_recv() {
            for node in &batch {
                prop_assert!(released_at.insert(node.clone(), clock).is_none(), "{} released twice", node);
            }
            clock += 1;
            for node in batch {
                resolver.complete(&node);
                completed_at.insert(node, clock);
            }
            clock += 1;
        }

        // stream closed: everything was visited and nothing is left
        prop_assert_eq!(released_at.len(), graph.len());
        prop_assert!(!resolver.snapshot().has_work());

        for prerequisite in graph.nodes() {
            for dependent in graph.dependents_of(prerequisite).into_iter().flatten() {
                prop_assert!(
                    completed_at[prerequisite] <= released_at[dependent.as_str()],
                    "{} released before {} completed",
                    dependent,
                    prerequisite
                );
            }
        }
    }
}
