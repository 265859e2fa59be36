// tests/graph_builder.rs

use devpipe::dag::{DepSet, ReverseDepGraph, build_reverse_deps};
use devpipe::errors::PipelineError;
use devpipe_test_utils::builders::{ComponentBuilder, ProjectBuilder, diamond_project};

fn deps(nodes: &[&str]) -> DepSet {
    nodes.iter().map(|n| n.to_string()).collect()
}

fn graph(entries: &[(&str, &[&str])]) -> ReverseDepGraph {
    entries
        .iter()
        .map(|(node, dependents)| (node.to_string(), deps(dependents)))
        .collect::<std::collections::BTreeMap<_, _>>()
        .into()
}

#[test]
fn single_component_single_task() {
    let project = ProjectBuilder::new().plain("foo").build();

    let g = build_reverse_deps(&project, &["foo"], &["build"]).unwrap();

    assert_eq!(g, graph(&[("foo.build", &[])]));
}

#[test]
fn tasks_of_one_component_are_chained_in_order() {
    let project = ProjectBuilder::new().plain("foo").build();

    let g = build_reverse_deps(&project, &["foo"], &["checkout", "build", "install"]).unwrap();

    assert_eq!(
        g,
        graph(&[
            ("foo.checkout", &["foo.build"]),
            ("foo.build", &["foo.install"]),
            ("foo.install", &[]),
        ])
    );
}

#[test]
fn independent_targets_have_no_edges() {
    let project = ProjectBuilder::new().plain("foo").plain("bar").build();

    let g = build_reverse_deps(&project, &["foo", "bar"], &["build"]).unwrap();

    assert_eq!(g, graph(&[("bar.build", &[]), ("foo.build", &[])]));
}

#[test]
fn linear_dependency_pulls_in_prerequisite() {
    let project = ProjectBuilder::new()
        .plain("foo")
        .depending("bar", "build", &["foo"])
        .build();

    // only `bar` is requested; `foo` comes in through its declaration
    let g = build_reverse_deps(&project, &["bar"], &["build"]).unwrap();

    assert_eq!(g, graph(&[("foo.build", &["bar.build"]), ("bar.build", &[])]));
}

#[test]
fn diamond_graph_edges() {
    let project = diamond_project();

    let g = build_reverse_deps(&project, &["biz"], &["build"]).unwrap();

    assert_eq!(
        g,
        graph(&[
            ("foo.build", &["bar.build", "baz.build"]),
            ("bar.build", &["biz.build"]),
            ("baz.build", &["biz.build"]),
            ("biz.build", &[]),
        ])
    );
}

#[test]
fn comma_separated_dependencies_are_split() {
    let project = ProjectBuilder::new()
        .plain("foo")
        .plain("bar")
        .depending("baz", "build", &["foo, bar", ""])
        .build();

    let g = build_reverse_deps(&project, &["baz"], &["build"]).unwrap();

    assert_eq!(g.dependents_of("foo.build"), Some(&deps(&["baz.build"])));
    assert_eq!(g.dependents_of("bar.build"), Some(&deps(&["baz.build"])));
}

#[test]
fn dependency_expansion_is_bounded_by_task_index() {
    // bar's checkout depends on foo: only foo.checkout is a prerequisite,
    // foo.build is not forced ahead of bar.checkout.
    let project = ProjectBuilder::new()
        .plain("foo")
        .depending("bar", "checkout", &["foo"])
        .build();

    let g = build_reverse_deps(&project, &["bar"], &["checkout", "build"]).unwrap();

    assert_eq!(
        g,
        graph(&[
            ("foo.checkout", &["bar.checkout"]),
            ("bar.checkout", &["bar.build"]),
            ("bar.build", &[]),
        ])
    );
    assert!(!g.contains("foo.build"));
}

#[test]
fn dependency_on_later_task_pulls_earlier_tasks_too() {
    let project = ProjectBuilder::new()
        .plain("foo")
        .depending("bar", "build", &["foo"])
        .build();

    let g = build_reverse_deps(&project, &["bar"], &["checkout", "build"]).unwrap();

    assert_eq!(
        g,
        graph(&[
            ("foo.checkout", &["foo.build"]),
            ("foo.build", &["bar.build"]),
            ("bar.checkout", &["bar.build"]),
            ("bar.build", &[]),
        ])
    );
}

#[test]
fn circular_dependency_is_built_without_recursing_forever() {
    let project = ProjectBuilder::new()
        .depending("foo", "build", &["bar"])
        .depending("bar", "build", &["foo"])
        .build();

    let g = build_reverse_deps(&project, &["foo"], &["build"]).unwrap();

    assert_eq!(
        g,
        graph(&[("foo.build", &["bar.build"]), ("bar.build", &["foo.build"])])
    );
}

#[test]
fn missing_dependency_is_reported_by_name() {
    let project = ProjectBuilder::new()
        .with(ComponentBuilder::new("foo").depends("build", &["missing"]))
        .build();

    let err = build_reverse_deps(&project, &["foo"], &["build"]).unwrap_err();

    match err {
        PipelineError::ComponentNotFound { name } => assert_eq!(name, "missing"),
        other => panic!("expected ComponentNotFound, got {other:?}"),
    }
}

#[test]
fn missing_target_is_reported_by_name() {
    let project = ProjectBuilder::new().plain("foo").build();

    let err = build_reverse_deps(&project, &["nope"], &["build"]).unwrap_err();

    assert!(matches!(err, PipelineError::ComponentNotFound { name } if name == "nope"));
}

#[test]
fn dependents_closure_follows_edges_forward() {
    let g = graph(&[
        ("a.build", &["b.build"]),
        ("b.build", &["c.build"]),
        ("c.build", &[]),
        ("x.build", &["c.build"]),
    ]);

    let trimmed = g.dependents_closure(vec!["b.build".to_string()]);

    assert_eq!(trimmed, graph(&[("b.build", &["c.build"]), ("c.build", &[])]));
}

fn chain_project(len: usize) -> devpipe::project::MemoryProject {
    let mut builder = ProjectBuilder::new().plain("c0");
    for i in 1..len {
        let prev = format!("c{}", i - 1);
        builder = builder.depending(&format!("c{i}"), "build", &[prev.as_str()]);
    }
    builder.build()
}

#[test]
fn long_dependency_chain_builds_without_exhausting_the_stack() {
    let project = chain_project(10_000);

    let g = build_reverse_deps(&project, &["c9999"], &["checkout", "build"]).unwrap();

    assert_eq!(g.len(), 20_000);
    assert_eq!(g.dependents_of("c0.build"), Some(&deps(&["c1.build"])));
    assert_eq!(
        g.dependents_of("c9998.build"),
        Some(&deps(&["c9999.build"]))
    );
    assert_eq!(
        g.dependents_of("c9999.checkout"),
        Some(&deps(&["c9999.build"]))
    );
}

#[test]
fn long_dependency_chain_resolves_both_ways() {
    let project = chain_project(10_000);

    let deep = devpipe::dag::resolve_deep(&project, &["c9999"], &["build"]).unwrap();
    assert_eq!(deep.plan().len(), 10_000);

    let reverse = devpipe::dag::resolve_reverse(&project, &["c0"], &["build"]).unwrap();
    assert_eq!(reverse.plan().len(), 10_000);
}

#[test]
fn shared_dependency_is_expanded_once_per_prefix() {
    // both targets reach `foo`; the second visit must not duplicate anything
    let project = ProjectBuilder::new()
        .plain("foo")
        .depending("bar", "build", &["foo"])
        .depending("baz", "checkout", &["foo"])
        .build();

    let g = build_reverse_deps(&project, &["bar", "baz"], &["checkout", "build"]).unwrap();

    assert_eq!(
        g,
        graph(&[
            ("foo.checkout", &["baz.checkout", "foo.build"]),
            ("foo.build", &["bar.build"]),
            ("bar.checkout", &["bar.build"]),
            ("bar.build", &[]),
            ("baz.checkout", &["baz.build"]),
            ("baz.build", &[]),
        ])
    );
}
