//! Listing engine and its actions
//!
//! A [`Listing`] holds only static configuration: a name, the field registry, the base
//! query state and settings. Each action rebuilds a [`QueryState`] from the base state plus
//! the submitted body, runs it through a [`ListingStore`] and returns a [`ListingResult`].
//!
//! | Action | Derivation |
//! |--------|------------|
//! | search | submitted state; a pending order is committed |
//! | sort   | submitted state; `sort` toggles one field; pending order discarded |
//! | resize | submitted state; limit doubled, offset 0 |
//! | reset  | base state |

use crate::error::CollateResult;
use crate::export::{CsvSink, ExportRow, ExportSummary, SpreadsheetSink, write_export};
use crate::field::FieldRegistry;
use crate::plan::QueryPlan;
use crate::settings::CollateSettings;
use crate::state::{QueryState, SubmittedState};
use async_trait::async_trait;
use collate_params::{BindLimits, Binder, FormBody};
use serde::Serialize;
use std::io::Write;

/// Query execution capability bound to one row type and one table
#[async_trait]
pub trait ListingStore: Send + Sync {
	/// Row type produced by [`fetch`](Self::fetch)
	type Row: Send;

	/// Count every row, ignoring all predicates
	async fn count_all(&self) -> CollateResult<i64>;

	/// Count rows matching the plan's predicates
	async fn count(&self, plan: &QueryPlan) -> CollateResult<i64>;

	/// Fetch the ordered page described by the plan
	async fn fetch(&self, plan: &QueryPlan) -> CollateResult<Vec<Self::Row>>;

	/// Whether the SQL `normalize` function is available on this store's connections
	fn supports_normalize(&self) -> bool;
}

/// Outcome of one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingResult<R> {
	/// Rows ignoring filters and search
	pub total: i64,
	/// Rows matching filters and search
	pub filtered: i64,
	/// Current page
	pub data: Vec<R>,
	/// State that produced this result
	pub query: QueryState,
}

/// One configured listing
pub struct Listing<S: ListingStore> {
	name: String,
	store: S,
	registry: FieldRegistry,
	base: QueryState,
	settings: CollateSettings,
	binder: Binder,
}

impl<S: ListingStore> Listing<S> {
	/// Create a listing with default settings and bind limits
	pub fn new(name: impl Into<String>, store: S, registry: FieldRegistry, base: QueryState) -> Self {
		Self {
			name: name.into(),
			store,
			registry,
			base,
			settings: CollateSettings::default(),
			binder: Binder::new(),
		}
	}

	/// Replace the settings
	pub fn with_settings(mut self, settings: CollateSettings) -> CollateResult<Self> {
		settings.validate()?;
		self.binder = settings.binder(*self.binder.limits())?;
		self.settings = settings;
		Ok(self)
	}

	/// Replace the binder's input-safety limits
	pub fn with_limits(mut self, limits: BindLimits) -> Self {
		self.binder = self.binder.with_limits(limits);
		self
	}

	/// Listing name, used in log events
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Field declarations
	pub fn registry(&self) -> &FieldRegistry {
		&self.registry
	}

	/// Base state every action starts from
	pub fn base(&self) -> &QueryState {
		&self.base
	}

	/// Settings
	pub fn settings(&self) -> &CollateSettings {
		&self.settings
	}

	/// CSV sink over `inner` using this listing's export date format
	pub fn csv_sink<W: Write>(&self, inner: W) -> CsvSink<W> {
		CsvSink::from_settings(inner, &self.settings)
	}

	/// Underlying store
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Run `state` against the store
	///
	/// Execution errors are returned as is; validation drops are only logged.
	pub async fn load(&self, state: &QueryState) -> CollateResult<ListingResult<S::Row>> {
		let plan = {
			let span = tracing::debug_span!("plan", listing = %self.name);
			let _guard = span.enter();
			QueryPlan::build(state, &self.registry, &self.settings)
		};

		let total = self.store.count_all().await?;
		let filtered = self.store.count(&plan).await?;
		let data = self.store.fetch(&plan).await?;

		Ok(ListingResult {
			total,
			filtered,
			data,
			query: state.clone(),
		})
	}

	/// Search: rehydrate everything and commit a pending order
	pub fn derive_search(&self, body: &FormBody) -> QueryState {
		let mut state = self.rehydrate(body).0;
		if let Some(pending) = state.pending_order.take() {
			state.order = pending;
		}
		state
	}

	/// Sort: rehydrate, toggle the clicked field, keep the pending order from the base state
	pub fn derive_sort(&self, body: &FormBody) -> QueryState {
		let (mut state, submitted) = self.rehydrate(body);
		state.pending_order = self.base.pending_order.clone();

		if let Some(field) = submitted.sort.as_deref() {
			if let Some(spec) = self.registry.sort_spec(field) {
				state.order.toggle(spec.display_field);
			} else {
				tracing::warn!(listing = %self.name, field = %field, "ignoring sort on undeclared field");
			}
		}

		if state.limit <= 0 {
			state.limit = self.base.limit;
		}
		state
	}

	/// Resize: rehydrate, double the limit and restart from the first row
	pub fn derive_resize(&self, body: &FormBody) -> QueryState {
		let (mut state, submitted) = self.rehydrate(body);

		let basis = match submitted.limit {
			Some(limit) if limit > 0 => limit,
			_ if self.base.limit > 0 => self.base.limit,
			_ => self.settings.default_limit,
		};
		state.limit = self.settings.clamp_limit(basis.saturating_mul(2));
		state.offset = 0;
		state
	}

	/// Reset: the base state, whatever was submitted
	pub fn derive_reset(&self) -> QueryState {
		self.base.clone()
	}

	/// Export: the search state widened to every matching row
	pub fn derive_export(&self, body: &FormBody) -> QueryState {
		let mut state = self.derive_search(body);
		state.limit = self.settings.export_limit;
		state.offset = 0;
		state
	}

	/// Search action
	pub async fn on_search(&self, body: &FormBody) -> CollateResult<ListingResult<S::Row>> {
		self.load(&self.derive_search(body)).await
	}

	/// Sort action
	pub async fn on_sort(&self, body: &FormBody) -> CollateResult<ListingResult<S::Row>> {
		self.load(&self.derive_sort(body)).await
	}

	/// Resize ("load more") action
	pub async fn on_resize(&self, body: &FormBody) -> CollateResult<ListingResult<S::Row>> {
		self.load(&self.derive_resize(body)).await
	}

	/// Reset action; the body is ignored
	pub async fn on_reset(&self, _body: &FormBody) -> CollateResult<ListingResult<S::Row>> {
		self.load(&self.derive_reset()).await
	}

	/// Export every row matching the submitted state to `sink`
	pub async fn on_export<K>(
		&self,
		body: &FormBody,
		filename_hint: &str,
		sink: &mut K,
	) -> CollateResult<ExportSummary>
	where
		S::Row: ExportRow,
		K: SpreadsheetSink + ?Sized,
	{
		let result = self.load(&self.derive_export(body)).await?;
		let summary = write_export(&result.data, self.registry.export_fields(), filename_hint, sink)?;
		tracing::debug!(listing = %self.name, rows = summary.rows, filename = %summary.filename, "export written");
		Ok(summary)
	}

	/// Bind `body` and overlay it on the base state
	///
	/// Binding failures are logged and the fields bound before the failure are kept.
	fn rehydrate(&self, body: &FormBody) -> (QueryState, SubmittedState) {
		let mut submitted = SubmittedState::default();
		if let Err(err) = self.binder.bind(body, &mut submitted) {
			tracing::warn!(listing = %self.name, error = %err, "binding failed; continuing with partial state");
		}
		let state = {
			let span = tracing::debug_span!("rehydrate", listing = %self.name);
			let _guard = span.enter();
			submitted.apply(&self.base, &self.registry)
		};
		(state, submitted)
	}
}
