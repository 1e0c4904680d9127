use anyhow::{anyhow, Result};
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument};
use tracing::debug;

use routerag_core::types::{sort_hits, RankedHit, SourceKind};

use crate::tantivy_utils::{build_schema, register_tokenizer};

const WRITER_MEMORY_BUDGET: usize = 20_000_000;

/// BM25 index over exactly one ingestion batch.
///
/// Statistics (document frequencies, average length) come from this batch
/// alone; a new batch means a new index.
pub struct SparseIndex {
	index: Index,
	searcher: Searcher,
	ordinal_field: Field,
	text_field: Field,
	len: usize,
}

impl SparseIndex {
	pub fn build<S: AsRef<str>>(texts: &[S]) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let ordinal_field = schema.get_field("ordinal")?;
		let text_field = schema.get_field("text")?;

		let mut index_writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BUDGET)?;
		for (ordinal, text) in texts.iter().enumerate() {
			index_writer.add_document(doc!(
				ordinal_field => ordinal as u64,
				text_field => text.as_ref().to_string(),
			))?;
		}
		index_writer.commit()?;

		let reader: IndexReader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let searcher = reader.searcher();
		debug!(docs = searcher.num_docs(), "sparse index built");
		Ok(Self { index, searcher, ordinal_field, text_field, len: texts.len() })
	}

	pub fn len(&self) -> usize { self.len }

	pub fn is_empty(&self) -> bool { self.len == 0 }

	pub fn num_docs(&self) -> u64 { self.searcher.num_docs() }

	/// Ranks documents with a lexical match for `query`, best first, ties by
	/// insertion order. Documents without a matching term are not returned.
	pub fn rank(&self, query: &str, depth: Option<usize>) -> Result<Vec<RankedHit>> {
		if self.len == 0 || query.trim().is_empty() { return Ok(Vec::new()); }
		let parser = QueryParser::for_index(&self.index, vec![self.text_field]);
		let (parsed, errors) = parser.parse_query_lenient(query);
		if !errors.is_empty() { debug!(errors = errors.len(), "lenient query parse dropped clauses"); }

		let top_docs = self.searcher.search(&parsed, &TopDocs::with_limit(self.len))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = self.searcher.doc(addr)?;
			let ordinal = doc
				.get_first(self.ordinal_field)
				.and_then(|v| v.as_u64())
				.ok_or_else(|| anyhow!("indexed document at {:?} has no ordinal", addr))?;
			hits.push(RankedHit { ordinal: ordinal as usize, score, source: SourceKind::Sparse });
		}
		sort_hits(&mut hits);
		if let Some(depth) = depth { hits.truncate(depth); }
		Ok(hits)
	}
}
