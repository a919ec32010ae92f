//! TransEngine: the public translation entry point.

use std::sync::Arc;
use std::time::Instant;

use dictrans_cache::{ReflectionCache, StructuralCache, WeakReferenceTracker};
use dictrans_core::config::ProcessingConfig;
use dictrans_core::models::{
    CircuitState, Direction, FieldWarning, ProcessingStatistics, TranslationReport, WarningKind,
};
use dictrans_core::traits::{
    IExpressionEvaluator, IPressureGate, IReferenceTracker, ITransApi, Translatable,
};
use dictrans_core::{DictTransConfig, DictTransError, DictTransResult};
use dictrans_observability::{events, translation_span};
use tracing::debug;

use crate::classifier::FieldClassifier;
use crate::executor::TranslationExecutor;
use crate::limits::{LimitDecision, ProcessingAction, ProcessingLimitManager};
use crate::planner;

/// Translates annotated fields between codes and labels.
///
/// Safe to share across threads; every call builds its own plan and only
/// the caches are shared.
pub struct TransEngine {
    api: Arc<dyn ITransApi>,
    evaluator: Option<Arc<dyn IExpressionEvaluator>>,
    structural: Arc<StructuralCache>,
    reflection: Arc<ReflectionCache>,
    tracker: Arc<WeakReferenceTracker>,
    processing: ProcessingConfig,
    limits: ProcessingLimitManager,
}

impl TransEngine {
    /// Create an engine with fresh caches sized from `config`.
    pub fn new(api: Arc<dyn ITransApi>, config: &DictTransConfig) -> Self {
        let tracker = Arc::new(WeakReferenceTracker::new());
        let structural = Arc::new(
            StructuralCache::new(&config.structural_cache).with_tracker(Arc::clone(&tracker)),
        );
        let reflection = Arc::new(ReflectionCache::new(&config.reflection_cache));
        Self::with_caches(api, config, structural, reflection, tracker)
    }

    /// Create an engine over caches shared with other components, typically
    /// the memory monitor.
    pub fn with_caches(
        api: Arc<dyn ITransApi>,
        config: &DictTransConfig,
        structural: Arc<StructuralCache>,
        reflection: Arc<ReflectionCache>,
        tracker: Arc<WeakReferenceTracker>,
    ) -> Self {
        Self {
            api,
            evaluator: None,
            structural,
            reflection,
            tracker,
            processing: config.processing.clone(),
            limits: ProcessingLimitManager::new(&config.processing),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn IExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Consult `gate` before every call: HIGH leaves the input untouched,
    /// CRITICAL fails the call.
    pub fn with_pressure_gate(mut self, gate: Arc<dyn IPressureGate>) -> Self {
        self.limits.set_pressure_gate(gate);
        self
    }

    pub fn processing_statistics(&self) -> ProcessingStatistics {
        self.limits.statistics()
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.limits.circuit_breaker().state()
    }

    pub fn limits(&self) -> &ProcessingLimitManager {
        &self.limits
    }

    pub fn structural_cache(&self) -> &Arc<StructuralCache> {
        &self.structural
    }

    pub fn reflection_cache(&self) -> &Arc<ReflectionCache> {
        &self.reflection
    }

    pub fn tracker(&self) -> &Arc<WeakReferenceTracker> {
        &self.tracker
    }

    /// Replace codes with labels on every annotated field reachable from `roots`.
    pub fn code2name<T: Translatable>(&self, roots: &mut [T]) -> DictTransResult<TranslationReport> {
        self.translate(roots, Direction::Code2Name)
    }

    /// Replace labels with codes on every annotated field reachable from `roots`.
    pub fn name2code<T: Translatable>(&self, roots: &mut [T]) -> DictTransResult<TranslationReport> {
        self.translate(roots, Direction::Name2Code)
    }

    pub fn code2name_one<T: Translatable>(&self, root: &mut T) -> DictTransResult<TranslationReport> {
        self.code2name(std::slice::from_mut(root))
    }

    pub fn name2code_one<T: Translatable>(&self, root: &mut T) -> DictTransResult<TranslationReport> {
        self.name2code(std::slice::from_mut(root))
    }

    fn translate<T: Translatable>(
        &self,
        roots: &mut [T],
        direction: Direction,
    ) -> DictTransResult<TranslationReport> {
        let span = translation_span!(direction, roots.len());
        let _guard = span.enter();
        let started = Instant::now();

        let mut report = TranslationReport::new(direction);
        let Some(type_name) = roots.first().map(|root| root.type_name()) else {
            return Ok(report);
        };

        let pressure = self.limits.check_memory_pressure();
        if !pressure.allowed() {
            return self.refuse(report, type_name, "memory_pressure", pressure);
        }
        let circuit = self.limits.check_circuit();
        if !circuit.allowed() {
            return self.refuse(report, type_name, "circuit_breaker", circuit);
        }

        let result = self.run(roots, started, &mut report);
        match &result {
            Ok(()) => self.limits.record_success(started.elapsed()),
            Err(err) => self.limits.record_failure(&err.to_string()),
        }

        let swept = self.tracker.cleanup();
        if swept > 0 {
            debug!(swept, "released schemas swept from the tracker");
        }

        result?;
        events::translation_completed(&report, started.elapsed().as_millis() as u64);
        Ok(report)
    }

    fn run<T: Translatable>(
        &self,
        roots: &mut [T],
        started: Instant,
        report: &mut TranslationReport,
    ) -> DictTransResult<()> {
        let classification =
            FieldClassifier::new(&self.structural, &self.reflection, &self.processing)
                .classify(roots);
        report.occurrences = classification.occurrences.len();
        report.warnings = classification.warnings;
        self.limits
            .record_limited(report.warnings_of(WarningKind::ProcessingLimit).count());

        let groups = planner::plan(&classification.occurrences);
        report.groups = groups.len();

        TranslationExecutor::new(
            self.api.as_ref(),
            self.evaluator.as_deref(),
            &self.reflection,
        )
        .with_deadline(self.limits.deadline(started))
        .execute(roots, &classification.occurrences, &groups, report)
    }

    /// Leave the input untouched, or fail the call for an abort.
    fn refuse(
        &self,
        mut report: TranslationReport,
        type_name: &str,
        limit: &str,
        decision: LimitDecision,
    ) -> DictTransResult<TranslationReport> {
        events::translation_refused(limit, &decision.reason);
        self.limits.record_limited(1);
        if decision.action == ProcessingAction::Abort {
            return Err(DictTransError::ProcessingAborted(decision.reason));
        }
        report.warnings.push(FieldWarning::new(
            type_name,
            "*",
            WarningKind::ProcessingLimit,
            decision.reason,
        ));
        Ok(report)
    }
}
