//! Two-phase processing pipeline.
//!
//! Phase A registers every document path single-threaded so forward wiki
//! links resolve to real documents instead of placeholders. Phase B processes
//! documents one by one (or in a rayon pool) against the shared registries
//! and unions the per-document graphs. Finalization then emits each global
//! entity and placeholder exactly once.

use crate::classifier::classify_field;
use crate::extractor;
use crate::resolver::resolve_wiki_link;
use chrono::{DateTime, Utc};
use kb_core::config::KbConfig;
use kb_core::error::KbError;
use kb_core::id::{self, DocumentIdentity};
use kb_core::model::{Document, DocumentEntities, LiteralValue};
use kb_core::registry::{DocumentRegistry, EntityRegistry, PlaceholderRegistry};
use kb_core::report::RunReport;
use kb_parser::document::ParsedDocument;
use kb_parser::ner::NerSpan;
use kb_rdf::emitter::RdfEmitter;
use kb_rdf::model::Graph;
use rayon::prelude::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// One document's worth of pipeline input: the parsed Markdown plus the
/// collaborator-supplied timestamps and NER spans.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub document: ParsedDocument,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub ner_spans: Vec<NerSpan>,
}

impl PipelineInput {
    pub fn new(document: ParsedDocument) -> Self {
        Self {
            document,
            created: None,
            modified: None,
            ner_spans: Vec::new(),
        }
    }
}

/// The union graph and run report of a completed (or cancelled) run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub graph: Graph,
    pub report: RunReport,
    /// True when the run stopped at a document boundary on request. The graph
    /// is then a valid subset of the complete output.
    pub cancelled: bool,
}

/// Orchestrates a processing run. Registries are owned here and handed to
/// the components that need them; nothing outlives the run.
pub struct Pipeline {
    config: KbConfig,
    emitter: RdfEmitter,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(config: KbConfig) -> Self {
        let emitter = RdfEmitter::new(config.base_uri.clone());
        Self {
            config,
            emitter,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked at every document boundary; set it to request an orderly
    /// stop.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Process `inputs` in the order given. `jobs` > 1 runs phase B on a
    /// rayon pool; the output graph is identical either way for a fixed
    /// input order, except for canonical-name choices that follow first
    /// observation.
    pub fn run(self, inputs: Vec<PipelineInput>, jobs: usize) -> Result<PipelineOutput, KbError> {
        let mut report = RunReport::default();
        let mut documents = DocumentRegistry::new(&self.config.link_extensions);

        // Phase A: register every document before any link resolution.
        let mut identities: Vec<Option<DocumentIdentity>> = Vec::with_capacity(inputs.len());
        for input in &inputs {
            match id::document_id(&input.document.source_path)
                .and_then(|identity| documents.register(&identity).map(|()| identity))
            {
                Ok(identity) => identities.push(Some(identity)),
                Err(err) if err.is_recoverable() => {
                    error!(path = %input.document.source_path, "skipping document: {err}");
                    report.record_skip(&input.document.source_path, &err);
                    identities.push(None);
                }
                Err(err) => return Err(err),
            }
        }
        info!(documents = documents.len(), "registered document paths");

        let entities = Mutex::new(EntityRegistry::new(self.config.warn_on_alias_collision));
        let placeholders = Mutex::new(PlaceholderRegistry::new());

        // Phase B: per-document processing against the now read-only
        // document registry.
        let work: Vec<(&PipelineInput, &DocumentIdentity)> = inputs
            .iter()
            .zip(&identities)
            .filter_map(|(input, identity)| identity.as_ref().map(|id| (input, id)))
            .collect();

        let results: Vec<DocumentOutcome> = if jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| KbError::EmissionFailure(format!("worker pool: {e}")))?;
            pool.install(|| {
                work.par_iter()
                    .map(|&(input, identity)| {
                        self.process_one(input, identity, &documents, &entities, &placeholders)
                    })
                    .collect()
            })
        } else {
            // Stop at the first fatal outcome; a fatal error ends the run at
            // the current document boundary.
            let mut results = Vec::with_capacity(work.len());
            for &(input, identity) in &work {
                let outcome =
                    self.process_one(input, identity, &documents, &entities, &placeholders);
                let fatal = matches!(outcome, DocumentOutcome::Fatal(_));
                results.push(outcome);
                if fatal {
                    break;
                }
            }
            results
        };

        // Single-threaded combiner.
        let mut graph = Graph::new();
        let mut cancelled = false;
        for outcome in results {
            match outcome {
                DocumentOutcome::Done(doc_graph) => {
                    report.documents_processed += 1;
                    graph.union(doc_graph);
                }
                DocumentOutcome::Skipped { path, reason } => {
                    report.record_skip(path, reason);
                }
                DocumentOutcome::Cancelled => cancelled = true,
                DocumentOutcome::Fatal(err) => return Err(err),
            }
        }

        // Run-level finalization: one block per global entity and
        // placeholder, regardless of how many documents mentioned it.
        let entities = entities.into_inner().expect("entity registry lock");
        let placeholders = placeholders.into_inner().expect("placeholder registry lock");
        for entity in entities.iter() {
            self.emitter.emit_global(entity, &mut graph);
        }
        for placeholder in placeholders.iter() {
            self.emitter.emit_placeholder(placeholder, &mut graph);
        }

        report.entities_by_kind = entities.counts_by_kind();
        report.placeholders_created = placeholders.len();
        report.collisions_detected = entities.collisions();

        Ok(PipelineOutput {
            graph,
            report,
            cancelled,
        })
    }

    /// Classify, extract, and emit one document. Recoverable problems
    /// produce `Skipped`; emission failures are fatal to the run.
    fn process_one(
        &self,
        input: &PipelineInput,
        identity: &DocumentIdentity,
        documents: &DocumentRegistry,
        entities: &Mutex<EntityRegistry>,
        placeholders: &Mutex<PlaceholderRegistry>,
    ) -> DocumentOutcome {
        if self.cancel.load(Ordering::Relaxed) {
            return DocumentOutcome::Cancelled;
        }

        let parsed = &input.document;
        let mut document = Document {
            id: identity.id.clone(),
            original_path: identity.original_path.clone(),
            path_without_extension: identity.path_without_extension.clone(),
            title: fallback_title(identity),
            created: input.created,
            modified: input.modified,
            word_count: parsed.word_count(),
            doc_type: None,
        };
        let mut extracted = DocumentEntities::default();

        // Frontmatter classification. Entity references resolve against the
        // shared registries; literals attach to the document.
        for (field, value) in &parsed.frontmatter {
            let classification = classify_field(field, value);
            for target in &classification.targets {
                let resolved = {
                    let mut entities = entities.lock().expect("entity registry lock");
                    let mut placeholders = placeholders.lock().expect("placeholder registry lock");
                    resolve_wiki_link(
                        target,
                        classification.context,
                        &document.id,
                        documents,
                        &mut entities,
                        &mut placeholders,
                    )
                };
                match resolved {
                    Ok(link) => extracted.add_reference(link.target_id),
                    Err(err) => {
                        debug!(field = %field, target = %target, "unresolvable frontmatter reference: {err}");
                    }
                }
            }
            for literal in classification.literals {
                let keep = match (literal.predicate.as_str(), &literal.value) {
                    ("title", LiteralValue::Str(title)) => {
                        document.title = title.clone();
                        true
                    }
                    ("type", LiteralValue::Str(doc_type)) => {
                        document.doc_type = Some(doc_type.clone());
                        true
                    }
                    // Frontmatter timestamps override filesystem metadata
                    // rather than emitting a second value.
                    ("created", LiteralValue::DateTime(dt)) => {
                        document.created = Some(*dt);
                        false
                    }
                    ("modified", LiteralValue::DateTime(dt)) => {
                        document.modified = Some(*dt);
                        false
                    }
                    _ => true,
                };
                if keep {
                    extracted.literals.push(literal);
                }
            }
        }

        // Element tree and NER extraction.
        let ner_spans: &[NerSpan] = if self.config.analyze_entities {
            &input.ner_spans
        } else {
            &[]
        };
        let element_diagnostics = {
            let mut entities = entities.lock().expect("entity registry lock");
            let mut placeholders = placeholders.lock().expect("placeholder registry lock");
            extractor::extract(
                parsed,
                &document.id,
                ner_spans,
                documents,
                &mut entities,
                &mut placeholders,
                &mut extracted,
            )
        };
        for diagnostic in &element_diagnostics {
            debug!(path = %document.original_path, "element skipped: {diagnostic}");
        }

        let mut doc_graph = Graph::new();
        match self.emitter.emit_document(&document, &extracted, &mut doc_graph) {
            Ok(()) => DocumentOutcome::Done(doc_graph),
            Err(err @ KbError::EmissionFailure(_)) => DocumentOutcome::Fatal(err),
            Err(err) => DocumentOutcome::Skipped {
                path: document.original_path.clone(),
                reason: err.to_string(),
            },
        }
    }
}

enum DocumentOutcome {
    Done(Graph),
    Skipped { path: String, reason: String },
    Cancelled,
    Fatal(KbError),
}

/// Title fallback when frontmatter supplies none: the filename without its
/// extension, exactly as spelled.
fn fallback_title(identity: &DocumentIdentity) -> String {
    identity
        .path_without_extension
        .rsplit('/')
        .next()
        .unwrap_or(&identity.path_without_extension)
        .to_string()
}
