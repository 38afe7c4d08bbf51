//! End-to-end pipeline scenarios over parsed in-memory documents.

use kb_core::config::KbConfig;
use kb_core::id::content_hash;
use kb_extract::pipeline::{Pipeline, PipelineInput, PipelineOutput};
use kb_parser::markdown::parse_document;
use kb_rdf::model::{Literal, Triple};
use kb_rdf::turtle::write_turtle;
use kb_rdf::vocab::{KbVocab, xsd};

const BASE: &str = "http://example.org/kb/";

fn vocab() -> KbVocab {
    KbVocab::new(BASE)
}

fn run(docs: &[(&str, &str)]) -> PipelineOutput {
    let inputs: Vec<PipelineInput> = docs
        .iter()
        .map(|(path, text)| PipelineInput::new(parse_document(path, text).unwrap()))
        .collect();
    Pipeline::new(KbConfig::default()).run(inputs, 1).unwrap()
}

fn has_pair(output: &PipelineOutput, doc_id: &str, entity_id: &str) -> bool {
    let vocab = vocab();
    let doc = vocab.entity(doc_id);
    let entity = vocab.entity(entity_id);
    output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.predicate("hasEntity"),
        entity.clone(),
    )) && output
        .graph
        .contains(&Triple::new(entity, vocab.predicate("mentionedIn"), doc))
}

#[test]
fn test_scenario_minimal_document() {
    let output = run(&[("readme.md", "# Hello\n\nBody.\n")]);
    let vocab = vocab();

    let doc = vocab.entity("/Document/readme");
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.rdf_type(),
        vocab.class("Document"),
    )));
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.rdfs_label(),
        Literal::plain("readme"),
    )));
    assert!(output.graph.contains(&Triple::new(
        doc,
        vocab.predicate("originalPath"),
        Literal::plain("readme.md"),
    )));

    let section = vocab.entity("/Document/readme/Section/hello");
    assert!(output.graph.contains(&Triple::new(
        section.clone(),
        vocab.predicate("heading"),
        Literal::plain("Hello"),
    )));
    assert!(output.graph.contains(&Triple::new(
        section,
        vocab.predicate("headingLevel"),
        Literal::typed("1", xsd::INTEGER),
    )));
    assert!(has_pair(
        &output,
        "/Document/readme",
        "/Document/readme/Section/hello"
    ));

    assert_eq!(output.report.documents_processed, 1);
    assert!(!output.report.has_skips());
}

#[test]
fn test_scenario_entity_dedup_across_documents() {
    let output = run(&[
        ("a.md", "---\nauthor: \"[[Alex Cipher]]\"\n---\nNotes.\n"),
        ("b.md", "---\nauthor: \"[[alex cipher]]\"\n---\nMore.\n"),
    ]);
    let vocab = vocab();

    let person = vocab.entity("/Person/alex-cipher");
    assert!(output.graph.contains(&Triple::new(
        person.clone(),
        vocab.rdf_type(),
        vocab.class("Person"),
    )));
    // Canonical name is the first observed surface form.
    assert!(output.graph.contains(&Triple::new(
        person.clone(),
        vocab.rdfs_label(),
        Literal::plain("Alex Cipher"),
    )));
    assert!(output.graph.contains(&Triple::new(
        person.clone(),
        vocab.predicate("alias"),
        Literal::plain("Alex Cipher"),
    )));
    assert!(output.graph.contains(&Triple::new(
        person,
        vocab.predicate("alias"),
        Literal::plain("alex cipher"),
    )));

    assert!(has_pair(&output, "/Document/a", "/Person/alex-cipher"));
    assert!(has_pair(&output, "/Document/b", "/Person/alex-cipher"));
    assert_eq!(output.report.entities_by_kind.get("Person"), Some(&1));
    assert_eq!(output.report.placeholders_created, 0);
}

#[test]
fn test_scenario_wiki_link_to_existing_file_with_spaces() {
    let output = run(&[
        ("Daily Notes/2024-11-07 Thursday.md", ""),
        ("index.md", "See [[Daily Notes/2024-11-07 Thursday]].\n"),
    ]);
    let vocab = vocab();

    let daily = vocab.entity("/Document/daily-notes/2024-11-07-thursday");
    assert!(output.graph.contains(&Triple::new(
        daily,
        vocab.predicate("originalPath"),
        Literal::plain("Daily Notes/2024-11-07 Thursday.md"),
    )));
    assert!(has_pair(
        &output,
        "/Document/index",
        "/Document/daily-notes/2024-11-07-thursday"
    ));
    assert_eq!(output.report.placeholders_created, 0);
}

#[test]
fn test_scenario_typed_wiki_link() {
    let output = run(&[("m.md", "Attending: [[person:Alex Cipher]]\n")]);

    assert!(has_pair(&output, "/Document/m", "/Person/alex-cipher"));
    assert_eq!(output.report.entities_by_kind.get("Person"), Some(&1));
    assert_eq!(output.report.placeholders_created, 0);
}

#[test]
fn test_scenario_placeholder_creation_and_reuse() {
    let output = run(&[
        ("x.md", "See [[Future Ideas]].\n"),
        ("y.md", "Also [[Future Ideas]].\n"),
    ]);
    let vocab = vocab();

    let placeholder = vocab.entity("/PlaceholderDocument/future-ideas");
    assert!(output.graph.contains(&Triple::new(
        placeholder.clone(),
        vocab.rdf_type(),
        vocab.class("PlaceholderDocument"),
    )));
    assert!(output.graph.contains(&Triple::new(
        placeholder,
        vocab.rdfs_label(),
        Literal::plain("Future Ideas"),
    )));
    assert!(has_pair(
        &output,
        "/Document/x",
        "/PlaceholderDocument/future-ideas"
    ));
    assert!(has_pair(
        &output,
        "/Document/y",
        "/PlaceholderDocument/future-ideas"
    ));
    assert_eq!(output.report.placeholders_created, 1);
}

#[test]
fn test_scenario_todos_with_leading_whitespace_and_stable_ids() {
    let text = "Plan:\n\n  - [x] Journaling\n - [ ] Walk\n";
    let output = run(&[("d.md", text)]);
    let vocab = vocab();

    let journaling_id = format!("/Document/d/TodoItem/3-{}", content_hash("Journaling"));
    let walk_id = format!("/Document/d/TodoItem/4-{}", content_hash("Walk"));

    assert!(output.graph.contains(&Triple::new(
        vocab.entity(&journaling_id),
        vocab.predicate("isCompleted"),
        Literal::typed("true", xsd::BOOLEAN),
    )));
    assert!(output.graph.contains(&Triple::new(
        vocab.entity(&walk_id),
        vocab.predicate("isCompleted"),
        Literal::typed("false", xsd::BOOLEAN),
    )));
    assert!(output.graph.contains(&Triple::new(
        vocab.entity(&journaling_id),
        vocab.predicate("lineNumber"),
        Literal::typed("3", xsd::INTEGER),
    )));

    // Re-running yields byte-identical ids and triples.
    let again = run(&[("d.md", text)]);
    assert_eq!(
        write_turtle(&output.graph, BASE),
        write_turtle(&again.graph, BASE)
    );
}

#[test]
fn test_bare_link_without_context_is_placeholder_not_person() {
    let output = run(&[("n.md", "Spotted [[ALEX CIPHER]] again.\n")]);

    assert_eq!(output.report.entities_by_kind.get("Person"), None);
    assert_eq!(output.report.placeholders_created, 1);
    assert!(has_pair(
        &output,
        "/Document/n",
        "/PlaceholderDocument/alex-cipher"
    ));
}

#[test]
fn test_organization_alias_merge_end_to_end() {
    let output = run(&[
        ("p.md", "---\ncompany: Galaxy Dynamics Co.\n---\nKickoff.\n"),
        ("q.md", "---\ncompany: Galaxy Dynamics Inc.\n---\nFollowup.\n"),
    ]);
    let vocab = vocab();

    let org = vocab.entity("/Organization/galaxy-dynamics");
    assert!(output.graph.contains(&Triple::new(
        org.clone(),
        vocab.predicate("alias"),
        Literal::plain("Galaxy Dynamics Co."),
    )));
    assert!(output.graph.contains(&Triple::new(
        org,
        vocab.predicate("alias"),
        Literal::plain("Galaxy Dynamics Inc."),
    )));
    assert_eq!(output.report.entities_by_kind.get("Organization"), Some(&1));
}

#[test]
fn test_frontmatter_literals_and_entity_fields() {
    let output = run(&[(
        "meeting.md",
        "---\ntitle: Weekly Sync\nstatus: draft\nversion: 2\nattendees:\n  - Alex Cipher\n  - Jordan Reyes\n---\nAgenda.\n",
    )]);
    let vocab = vocab();

    let doc = vocab.entity("/Document/meeting");
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.rdfs_label(),
        Literal::plain("Weekly Sync"),
    )));
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.predicate("status"),
        Literal::plain("draft"),
    )));
    assert!(output.graph.contains(&Triple::new(
        doc,
        vocab.predicate("version"),
        Literal::typed("2", xsd::INTEGER),
    )));

    assert!(has_pair(&output, "/Document/meeting", "/Person/alex-cipher"));
    assert!(has_pair(&output, "/Document/meeting", "/Person/jordan-reyes"));
    assert_eq!(output.report.entities_by_kind.get("Person"), Some(&2));
}

#[test]
fn test_empty_document_still_produces_document_node() {
    let output = run(&[("2024-11-07.md", "")]);
    let vocab = vocab();

    let doc = vocab.entity("/Document/2024-11-07");
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.rdf_type(),
        vocab.class("Document"),
    )));
    // Label falls back to the filename without extension, as spelled.
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.rdfs_label(),
        Literal::plain("2024-11-07"),
    )));
    assert!(output.graph.contains(&Triple::new(
        doc,
        vocab.predicate("originalPath"),
        Literal::plain("2024-11-07.md"),
    )));
}

#[test]
fn test_colliding_ids_share_one_document_subject() {
    // Both stems normalize to "x": the ids collide, the paths do not, and
    // registration of an identical id is not a duplicate.
    let inputs = vec![
        PipelineInput::new(parse_document("x.md", "One.\n").unwrap()),
        PipelineInput::new(parse_document("x.markdown", "Two.\n").unwrap()),
    ];
    let output = Pipeline::new(KbConfig::default()).run(inputs, 1).unwrap();
    assert_eq!(output.report.documents_processed, 2);
    assert!(!output.report.has_skips());

    let vocab = vocab();
    let doc = vocab.entity("/Document/x");
    // One subject carrying both original paths.
    assert!(output.graph.contains(&Triple::new(
        doc.clone(),
        vocab.predicate("originalPath"),
        Literal::plain("x.md"),
    )));
    assert!(output.graph.contains(&Triple::new(
        doc,
        vocab.predicate("originalPath"),
        Literal::plain("x.markdown"),
    )));
}

#[test]
fn test_unsluggable_path_is_skipped_with_diagnostic() {
    let inputs = vec![
        PipelineInput::new(parse_document("???.md", "Unusable.\n").unwrap()),
        PipelineInput::new(parse_document("ok.md", "Fine.\n").unwrap()),
    ];
    let output = Pipeline::new(KbConfig::default()).run(inputs, 1).unwrap();
    assert_eq!(output.report.documents_processed, 1);
    assert!(output.report.has_skips());
    assert_eq!(output.report.documents_skipped[0].path, "???.md");
}

#[test]
fn test_deterministic_across_runs() {
    let docs = [
        ("notes/one.md", "# One\n\nSee [[notes/two]] and #shared.\n"),
        ("notes/two.md", "# Two\n\n- [x] Ship it\n"),
        ("notes/three.md", "---\nauthor: Alex Cipher\n---\nBody [[Missing]].\n"),
    ];
    let first = run(&docs);
    let second = run(&docs);
    assert_eq!(
        write_turtle(&first.graph, BASE),
        write_turtle(&second.graph, BASE)
    );
    assert_eq!(first.graph.len(), second.graph.len());
}

#[test]
fn test_parallel_run_matches_sequential_triple_set() {
    let docs = [
        ("a.md", "# A\n\nSee [[b]].\n"),
        ("b.md", "# B\n\n- [ ] Task\n"),
        ("c.md", "---\nattendees:\n  - Alex Cipher\n---\nMet.\n"),
    ];
    let sequential = run(&docs);

    let inputs: Vec<PipelineInput> = docs
        .iter()
        .map(|(path, text)| PipelineInput::new(parse_document(path, text).unwrap()))
        .collect();
    let parallel = Pipeline::new(KbConfig::default()).run(inputs, 4).unwrap();

    assert_eq!(
        write_turtle(&sequential.graph, BASE),
        write_turtle(&parallel.graph, BASE)
    );
}

#[test]
fn test_cancellation_before_start_yields_empty_subset() {
    let pipeline = Pipeline::new(KbConfig::default());
    pipeline.cancel_flag().store(true, std::sync::atomic::Ordering::Relaxed);
    let inputs = vec![PipelineInput::new(parse_document("a.md", "Hi.\n").unwrap())];
    let output = pipeline.run(inputs, 1).unwrap();

    assert!(output.cancelled);
    assert_eq!(output.report.documents_processed, 0);
}
