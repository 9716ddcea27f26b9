//! The brain: one request in, one finalized scene graph out.
//!
//! Phases run strictly in order and each reports progress:
//!
//! 1. **analyzing_intent** validates the request.
//! 2. **detecting_style** picks the style (forced or keyword-scored).
//! 3. **planning_narrative** makes the single generator call, recovers the
//!    JSON and plans the narrative arc.
//! 4. **structuring_scenes** assigns phases, times beats and fits each scene
//!    to its tempo profile.
//! 5. **creating_beats** injects breathing into interior scenes and balances
//!    it, then enforces the visual hierarchy.
//! 6. **validating_quality** applies the palette and judges every scene,
//!    with one auto-fix attempt each, plus the video-level checks.
//! 7. **finalizing** assigns image patterns, plans transitions and builds
//!    the reports.
//!
//! Only a rejected request, a failed generator call, an unparsable response
//! or a response without scenes aborts the run. Every other issue is
//! reported alongside the result.

use beatforge_core::beat_timing::retime_scene;
use beatforge_core::breathing::{apply_video_breathing, balance_breathing, measure_breathing};
use beatforge_core::hierarchy::{compute_hierarchy, enforce_hierarchy};
use beatforge_core::narrative::plan_arc;
use beatforge_core::palette::{apply_palette_to_video, select_palette, validate_palette_consistency};
use beatforge_core::quality::{assess_video_structure, build_quality_report, judge_scene};
use beatforge_core::result::total_duration;
use beatforge_core::tempo::{adjust_scene_tempo, TempoReport};
use beatforge_core::transition::plan_transitions;
use beatforge_core::visual_flow::{assign_image_patterns, build_visual_flow_report};
use beatforge_core::{GenerationRequest, GenerationResult, ProfileTables, Scene};
use beatforge_events::{PipelinePhase, ProgressSink, ProgressTracker};
use beatforge_llm::TextGenerator;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::prompt::build_text_request;
use crate::response::recover_json;
use crate::structure::{parse_generation, structure_video};
use crate::style::detect_style;

/// Orchestrates every pass around one call to the text generator.
pub struct Brain<G> {
    generator: G,
    tables: ProfileTables,
    config: PipelineConfig,
}

impl<G: TextGenerator> Brain<G> {
    /// A brain with the built-in tables and default configuration.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            tables: ProfileTables::default(),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_tables(mut self, tables: ProfileTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tables(&self) -> &ProfileTables {
        &self.tables
    }

    /// Run the whole pipeline for `request`, reporting progress to `sink`.
    ///
    /// On success the last event is `complete` at 100. On failure no
    /// `complete` event is sent and nothing partial is returned.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        sink: &dyn ProgressSink,
    ) -> Result<GenerationResult, PipelineError> {
        let mut progress = ProgressTracker::new(sink);
        let result = self.run(request, &mut progress).await;
        if let Err(e) = &result {
            tracing::error!(phase = %progress.phase(), error = %e, "Generation failed");
        }
        result
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<GenerationResult, PipelineError> {
        let fps = self.config.fps;

        // -- analyzing_intent ---------------------------------------------------
        progress.report(PipelinePhase::AnalyzingIntent, 0, "Analyzing request");
        request.check()?;
        progress.report(PipelinePhase::AnalyzingIntent, 100, "Request validated");

        // -- detecting_style ----------------------------------------------------
        progress.report(PipelinePhase::DetectingStyle, 0, "Detecting style");
        let (style, source) = detect_style(request);
        let profile = self.tables.style(style).clone();
        tracing::info!(style = %style, source = ?source, "Style selected");
        progress.report(PipelinePhase::DetectingStyle, 100, format!("Style: {style}"));

        // -- planning_narrative -------------------------------------------------
        progress.report(PipelinePhase::PlanningNarrative, 0, "Requesting narrative");
        let text_request = build_text_request(request, &profile, &self.config);
        let text = self.generator.generate(&text_request).await?;
        progress.report(PipelinePhase::PlanningNarrative, 50, "Parsing narrative");

        let raw = parse_generation(recover_json(&text)?)?;
        let video = structure_video(raw, request, &profile, fps)?;
        let count = video.scenes.len();
        let arc = plan_arc(count);
        tracing::info!(scenes = count, strategy = ?arc.strategy, "Narrative arc planned");
        progress.report(
            PipelinePhase::PlanningNarrative,
            100,
            format!("{count} scenes planned"),
        );

        // -- structuring_scenes -------------------------------------------------
        let mut scenes = Vec::with_capacity(count);
        let mut tempo_scenes = Vec::with_capacity(count);
        for (index, structured) in video.scenes.into_iter().enumerate() {
            let mut scene = structured.scene;
            scene.phase = arc.phase_of(index);
            let timed = if !structured.explicitly_timed || scene.content_end() > scene.duration_frames {
                tracing::debug!(scene_id = %scene.id, "Computing beat timings");
                retime_scene(&scene)
            } else {
                scene
            };
            let tempo = self.tables.tempo_for(timed.phase, style);
            let (adjusted, report) = adjust_scene_tempo(&timed, &tempo, &profile);
            progress.report_scene(
                PipelinePhase::StructuringScenes,
                index + 1,
                count,
                format!("Structured scene {}", adjusted.id),
            );
            scenes.push(adjusted);
            tempo_scenes.push(report);
        }
        let tempo_report = TempoReport::from_scenes(tempo_scenes);

        // -- creating_beats -----------------------------------------------------
        progress.report(PipelinePhase::CreatingBeats, 0, "Placing breathing moments");
        let (scenes, breathing_balance) = if self.config.inject_breathing {
            let breathed = apply_video_breathing(&scenes, &self.tables, style, fps);
            balance_breathing(&breathed, &self.tables, style)
        } else {
            let balance = measure_breathing(&scenes);
            (scenes, balance)
        };

        let mut focused = Vec::with_capacity(count);
        let mut hierarchy = Vec::with_capacity(count);
        for (index, scene) in scenes.iter().enumerate() {
            let (scene, spec) = if self.config.enforce_hierarchy {
                enforce_hierarchy(scene)
            } else {
                (scene.clone(), compute_hierarchy(scene))
            };
            let scene = cover_beats(scene);
            progress.report_scene(
                PipelinePhase::CreatingBeats,
                index + 1,
                count,
                format!("Focused scene {}", scene.id),
            );
            focused.push(scene);
            hierarchy.push(spec);
        }

        // -- validating_quality -------------------------------------------------
        progress.report(PipelinePhase::ValidatingQuality, 0, "Applying palette");
        let palette = select_palette(
            &self.tables,
            style,
            &request.prompt,
            request.brand_color.as_ref(),
        );
        tracing::info!(palette = %palette.name, "Palette locked");
        let painted = apply_palette_to_video(&focused, &palette);

        let mut judged = Vec::with_capacity(count);
        let mut assessments = Vec::with_capacity(count);
        for (index, scene) in painted.iter().enumerate() {
            let (scene, assessment) = judge_scene(scene, &profile, self.config.auto_fix);
            progress.report_scene(
                PipelinePhase::ValidatingQuality,
                index + 1,
                count,
                format!("Validated scene {}", scene.id),
            );
            judged.push(scene);
            assessments.push(assessment);
        }
        let video_issues = assess_video_structure(&judged, &video.emotional_arc);

        // -- finalizing ---------------------------------------------------------
        progress.report(PipelinePhase::Finalizing, 0, "Planning transitions");
        let scenes = assign_image_patterns(&judged, &self.tables.image_patterns);
        let transitions = plan_transitions(&scenes, style, self.config.jitter_seed);
        let visual_flow = build_visual_flow_report(&scenes, &transitions);
        let palette_report = validate_palette_consistency(&scenes, &palette);
        let quality_report = build_quality_report(&assessments, &video_issues);
        let total_duration_frames = total_duration(&scenes);
        progress.report(PipelinePhase::Finalizing, 100, "Reports assembled");

        tracing::info!(
            style = %style,
            scenes = scenes.len(),
            total_frames = total_duration_frames,
            all_scenes_valid = quality_report.all_scenes_valid,
            warnings = quality_report.warnings.len(),
            "Generation finished"
        );
        progress.complete("Generation complete");

        Ok(GenerationResult {
            style,
            style_profile: profile,
            language: request.language().to_string(),
            concept: video.concept,
            emotional_arc: video.emotional_arc,
            fps,
            scenes,
            total_duration_frames,
            quality_report,
            visual_flow: Some(visual_flow),
            narrative_arc: arc,
            tempo_report,
            hierarchy,
            palette,
            palette_report,
            breathing_balance,
            transitions,
            scene_assessments: assessments,
            video_issues,
        })
    }
}

/// Extend the scene so no beat ends past it.
fn cover_beats(mut scene: Scene) -> Scene {
    let end = scene.beats_end();
    if end > scene.duration_frames {
        tracing::debug!(scene_id = %scene.id, from = scene.duration_frames, to = end, "Extending scene to cover beats");
        scene.duration_frames = end;
    }
    scene
}
