// Comparison session: keeps the driver slots and recomputes what the
// renderers show every time a slot changes.

pub mod slots;
pub mod summary;

use itertools::Itertools;
use log::{debug, warn};

pub use slots::{BoundLap, SLOT_COUNT, SlotBindings};
pub use summary::{LapSummary, LapSummaryView};

use crate::{
    LapDeltaError,
    analysis::{
        AlignedDelta, SegmentBounds, TrackSegmentation, compute_delta, compute_dominance,
        validate_series,
    },
    colors::{ColorLookup, ColorToken},
    config::AppConfig,
    session::{SessionKind, personal_best},
    telemetry::{DriverId, LapProvider, LoadedLap},
    track::{CircuitGeometryProvider, CircuitInfo, Point2D, TrackMap, corner_label_position},
};

/// Everything about the session that stays fixed while laps are swapped
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub year: i32,
    pub kind: SessionKind,
    pub circuit: CircuitInfo,
    pub segmentation: TrackSegmentation,
    /// Distance covered by the session's fastest lap, lines up race lap 1
    pub reference_max_distance: Option<f64>,
    pub delta_padding_s: f64,
    pub corner_label_offset: f64,
}

impl SessionContext {
    pub fn resolve<P>(provider: &P, config: &AppConfig) -> Result<Self, LapDeltaError>
    where
        P: LapProvider + CircuitGeometryProvider,
    {
        let session = provider.session();
        let circuit = provider.circuit(session)?;
        let reference_max_distance = provider
            .fastest_lap()
            .and_then(|lap| lap.series.max_distance());

        let length = if circuit.length > 0. {
            circuit.length
        } else {
            let fallback = reference_max_distance.unwrap_or_default();
            warn!(
                "No circuit length for {} {}, using fastest lap distance {:.1}m",
                session.year, session.event, fallback
            );
            fallback
        };
        let segmentation = TrackSegmentation::new(length, config.segment_count)?;

        Ok(Self {
            year: session.year,
            kind: provider.kind(),
            circuit,
            segmentation,
            reference_max_distance,
            delta_padding_s: config.delta_padding_s,
            corner_label_offset: config.corner_label_offset,
        })
    }

    fn corner_labels(&self) -> Vec<CornerLabel> {
        self.circuit
            .corners
            .iter()
            .map(|corner| CornerLabel {
                label: corner.label(),
                position: corner_label_position(
                    corner,
                    self.circuit.rotation_deg,
                    self.corner_label_offset,
                ),
            })
            .collect()
    }
}

/// Loads `lap_number` of `driver`, or the driver's personal best when no lap
/// number is given
pub fn select_lap(
    provider: &impl LapProvider,
    driver: &str,
    lap_number: Option<u32>,
) -> Result<LoadedLap, LapDeltaError> {
    let lap_number = match lap_number {
        Some(lap_number) => lap_number,
        None => {
            let laps = provider.laps_for(driver).into_iter().cloned().collect_vec();
            personal_best(provider.kind(), &laps)
                .map(|lap| lap.lap_number)
                .ok_or_else(|| LapDeltaError::LapNotFound {
                    driver: driver.to_string(),
                    lap_number: 0,
                })?
        }
    };
    provider.load_lap(driver, lap_number)
}

/// Delta curve of one bound slot against the reference lap
#[derive(Clone, Debug, PartialEq)]
pub struct DeltaTrace {
    pub slot: usize,
    pub driver: DriverId,
    pub lap_number: u32,
    /// Lap the curve was computed against
    pub reference_driver: DriverId,
    pub reference_lap_number: u32,
    pub color: Option<ColorToken>,
    pub delta: AlignedDelta,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeltaOverlay {
    pub reference_driver: Option<DriverId>,
    pub traces: Vec<DeltaTrace>,
    /// Vertical extent of all traces plus padding
    pub y_range: Option<(f64, f64)>,
}

/// One minisector on the track map. No winner means it is drawn neutral.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentView {
    pub index: usize,
    pub bounds: SegmentBounds,
    pub winner: Option<DriverId>,
    pub color: Option<ColorToken>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CornerLabel {
    pub label: String,
    pub position: Point2D,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DominanceOverlay {
    pub segments: Vec<SegmentView>,
    pub track_map: Option<TrackMap>,
    pub corner_labels: Vec<CornerLabel>,
}

impl DominanceOverlay {
    fn neutral(context: &SessionContext) -> Self {
        Self {
            segments: context
                .segmentation
                .bounds()
                .into_iter()
                .map(|bounds| SegmentView {
                    index: bounds.index,
                    bounds,
                    winner: None,
                    color: None,
                })
                .collect(),
            track_map: None,
            corner_labels: context.corner_labels(),
        }
    }
}

/// What the renderers draw
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComparisonView {
    pub delta: DeltaOverlay,
    pub dominance: DominanceOverlay,
    /// Lap summaries of the bound slots, in slot order
    pub summaries: Vec<(usize, LapSummaryView)>,
}

/// Non-fatal problem shown to the user, the previous view stays on screen
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub slot: Option<usize>,
    pub message: String,
}

pub trait ComparisonRenderer {
    fn render(&mut self, view: &ComparisonView);
    fn notify(&mut self, notice: &Notice);
}

/// Up to [`SLOT_COUNT`] laps compared against each other.
///
/// The first bound slot is the reference lap: every other bound lap gets a
/// delta curve against it. Track dominance uses every bound lap.
pub struct ComparisonSession<R, C> {
    context: SessionContext,
    slots: SlotBindings,
    colors: C,
    renderer: R,
    view: ComparisonView,
}

impl<R: ComparisonRenderer, C: ColorLookup> ComparisonSession<R, C> {
    pub fn new(context: SessionContext, colors: C, renderer: R) -> Self {
        let view = ComparisonView {
            dominance: DominanceOverlay::neutral(&context),
            ..Default::default()
        };
        Self {
            context,
            slots: SlotBindings::default(),
            colors,
            renderer,
            view,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn view(&self) -> &ComparisonView {
        &self.view
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn bindings(&self) -> &SlotBindings {
        &self.slots
    }

    pub fn bound_laps(&self) -> impl Iterator<Item = (usize, &BoundLap)> {
        self.slots.bound()
    }

    /// Binds `lap` to `slot`, replacing whatever was there, and recomputes
    pub fn assign(&mut self, slot: usize, lap: LoadedLap) -> Result<(), LapDeltaError> {
        let bound = self.bind(lap);
        if let Some(previous) = self.slots.bind(slot, bound)? {
            debug!(
                "Slot {} released lap {} of {}",
                slot, previous.info.lap_number, previous.info.driver
            );
        }
        self.recompute();
        Ok(())
    }

    pub fn clear(&mut self, slot: usize) -> Result<(), LapDeltaError> {
        if let Some(previous) = self.slots.clear(slot)? {
            debug!(
                "Cleared slot {} (lap {} of {})",
                slot, previous.info.lap_number, previous.info.driver
            );
            self.recompute();
        }
        Ok(())
    }

    /// Rebuilds the view from the current bindings and pushes it to the renderer
    pub fn recompute(&mut self) {
        let mut notices = Vec::new();
        let delta = self.delta_overlay(&mut notices);
        let dominance = self.dominance_overlay(&mut notices);
        let summaries = self
            .slots
            .bound()
            .map(|(slot, lap)| (slot, lap.summary.formatted()))
            .collect();

        self.view = ComparisonView {
            delta,
            dominance,
            summaries,
        };
        for notice in &notices {
            self.renderer.notify(notice);
        }
        self.renderer.render(&self.view);
    }

    fn bind(&self, lap: LoadedLap) -> BoundLap {
        let LoadedLap { info, series } = lap;
        let aligned = self
            .context
            .kind
            .align_first_lap(&series, self.context.reference_max_distance);
        let summary = LapSummary::resolve(self.context.kind, &info, series.is_personal_best);
        let color = self
            .colors
            .color_for(&info.driver, &info.team, self.context.year);
        BoundLap {
            info,
            series,
            aligned,
            summary,
            color,
        }
    }

    fn delta_overlay(&self, notices: &mut Vec<Notice>) -> DeltaOverlay {
        let Some((reference_slot, reference)) = self.slots.reference() else {
            return DeltaOverlay::default();
        };
        // an unusable reference fails every pairing, the previous curves stay as they were
        if let Err(e) = validate_series(&reference.series) {
            warn!("Reference lap in slot {} unusable: {}", reference_slot, e);
            notices.push(Notice {
                slot: Some(reference_slot),
                message: e.to_string(),
            });
            return self.view.delta.clone();
        }

        let reference_driver = &reference.info.driver;
        let reference_lap_number = reference.info.lap_number;
        let mut traces = Vec::new();
        for (slot, lap) in self.slots.bound().skip(1) {
            match compute_delta(&reference.series, &lap.series) {
                Ok(delta) => traces.push(DeltaTrace {
                    slot,
                    driver: lap.info.driver.clone(),
                    lap_number: lap.info.lap_number,
                    reference_driver: reference_driver.clone(),
                    reference_lap_number,
                    color: lap.color.clone(),
                    delta,
                }),
                Err(e) => {
                    warn!("Delta for slot {} not updated: {}", slot, e);
                    notices.push(Notice {
                        slot: Some(slot),
                        message: e.to_string(),
                    });
                    let previous = self.view.delta.traces.iter().find(|t| {
                        t.slot == slot
                            && t.reference_driver == *reference_driver
                            && t.reference_lap_number == reference_lap_number
                    });
                    if let Some(previous) = previous {
                        traces.push(previous.clone());
                    }
                }
            }
        }

        let padding = self.context.delta_padding_s;
        let y_range = traces
            .iter()
            .filter_map(|trace| trace.delta.range())
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
            .map(|(min, max)| (min - padding, max + padding));

        DeltaOverlay {
            reference_driver: Some(reference_driver.clone()),
            traces,
            y_range,
        }
    }

    fn dominance_overlay(&self, notices: &mut Vec<Notice>) -> DominanceOverlay {
        let bound = self.slots.bound().map(|(_, lap)| lap).collect_vec();
        let dominance = match compute_dominance(
            bound.iter().map(|lap| &lap.aligned),
            &self.context.segmentation,
        ) {
            Ok(dominance) => dominance,
            Err(LapDeltaError::NoContendingLaps) => {
                debug!("No laps bound, track map is neutral");
                return DominanceOverlay::neutral(&self.context);
            }
            Err(e) => {
                warn!("Track dominance not updated: {}", e);
                notices.push(Notice {
                    slot: None,
                    message: e.to_string(),
                });
                return self.view.dominance.clone();
            }
        };

        let mut overlay = DominanceOverlay::neutral(&self.context);
        for segment in &mut overlay.segments {
            if let Some(winner) = dominance.get(&segment.index) {
                segment.winner = Some(winner.driver.clone());
                segment.color = bound[winner.participant].color.clone();
            }
        }
        overlay.track_map = bound.first().map(|reference| {
            TrackMap::build(
                &reference.aligned,
                &self.context.circuit,
                &self.context.segmentation,
            )
        });
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        telemetry::{LapInfo, LapSeries, LapTelemetrySample},
        track::CornerMarker,
    };
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingRenderer {
        views: Vec<ComparisonView>,
        notices: Vec<Notice>,
    }

    impl ComparisonRenderer for RecordingRenderer {
        fn render(&mut self, view: &ComparisonView) {
            self.views.push(view.clone());
        }

        fn notify(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    struct TeamColors;

    impl ColorLookup for TeamColors {
        fn color_for(&self, _driver: &str, team: &str, _year: i32) -> Option<ColorToken> {
            match team {
                "Ferrari" => Some(ColorToken("#E8002D".to_string())),
                "McLaren" => Some(ColorToken("#FF8000".to_string())),
                _ => None,
            }
        }
    }

    fn context(kind: SessionKind) -> SessionContext {
        SessionContext {
            year: 2023,
            kind,
            circuit: CircuitInfo {
                length: 300.,
                rotation_deg: 0.,
                corners: vec![CornerMarker {
                    number: 1,
                    x: 10.,
                    y: 0.,
                    ..Default::default()
                }],
            },
            segmentation: TrackSegmentation::new(300., 3).unwrap(),
            reference_max_distance: Some(300.),
            delta_padding_s: 0.1,
            corner_label_offset: 5.,
        }
    }

    /// Lap over 0..=300m at constant speed, `secs_per_100m` per 100m
    fn lap(driver: &str, team: &str, lap_number: u32, secs_per_100m: f64) -> LoadedLap {
        let samples = (0..=30)
            .map(|i| {
                let distance = i as f64 * 10.;
                LapTelemetrySample {
                    distance,
                    time_offset: Duration::from_secs_f64(distance / 100. * secs_per_100m),
                    x: distance,
                    ..Default::default()
                }
            })
            .collect();
        LoadedLap {
            info: LapInfo {
                driver: driver.to_string(),
                team: team.to_string(),
                lap_number,
                lap_time: Some(Duration::from_secs_f64(3. * secs_per_100m)),
                ..Default::default()
            },
            series: LapSeries::new(driver, lap_number, samples),
        }
    }

    fn session(kind: SessionKind) -> ComparisonSession<RecordingRenderer, TeamColors> {
        ComparisonSession::new(context(kind), TeamColors, RecordingRenderer::default())
    }

    #[test]
    fn test_single_lap_has_no_delta() {
        let mut session = session(SessionKind::Qualifying);
        session.assign(1, lap("LEC", "Ferrari", 12, 1.0)).unwrap();

        let view = session.view();
        assert_eq!(view.delta.reference_driver.as_deref(), Some("LEC"));
        assert!(view.delta.traces.is_empty());
        assert!(view.delta.y_range.is_none());
        assert!(view.dominance.segments.iter().all(|s| s.winner.as_deref() == Some("LEC")));
        assert!(view.dominance.track_map.is_some());
        assert_eq!(view.summaries.len(), 1);
        assert_eq!(view.summaries[0].1.lap_time, "0:03.000");
        assert_eq!(session.renderer().views.len(), 1);
    }

    #[test]
    fn test_two_laps_produce_delta_and_dominance() {
        let mut session = session(SessionKind::Qualifying);
        session.assign(0, lap("LEC", "Ferrari", 12, 1.0)).unwrap();
        session.assign(2, lap("NOR", "McLaren", 9, 1.1)).unwrap();

        let view = session.view();
        assert_eq!(view.delta.traces.len(), 1);
        let trace = &view.delta.traces[0];
        assert_eq!(trace.slot, 2);
        assert_eq!(trace.driver, "NOR");
        assert_eq!(trace.color, Some(ColorToken("#FF8000".to_string())));
        assert!((trace.delta.delta_at(100.).unwrap() + 0.1).abs() < 1e-3);

        let (low, high) = view.delta.y_range.unwrap();
        let (min, max) = trace.delta.range().unwrap();
        assert!((low - (min - 0.1)).abs() < 1e-9);
        assert!((high - (max + 0.1)).abs() < 1e-9);

        for segment in &view.dominance.segments {
            assert_eq!(segment.winner.as_deref(), Some("LEC"));
            assert_eq!(segment.color, Some(ColorToken("#E8002D".to_string())));
        }
        assert_eq!(
            view.summaries.iter().map(|(slot, _)| *slot).collect_vec(),
            vec![0, 2]
        );
        assert!(session.renderer().notices.is_empty());
    }

    #[test]
    fn test_failed_pairing_keeps_previous_trace() {
        let mut session = session(SessionKind::Qualifying);
        session.assign(0, lap("LEC", "Ferrari", 12, 1.0)).unwrap();
        session.assign(1, lap("SAI", "Ferrari", 8, 1.2)).unwrap();
        let previous = session.view().delta.traces[0].clone();

        let mut broken = lap("SAI", "Ferrari", 9, 1.2);
        broken.series.samples.truncate(1);
        session.assign(1, broken).unwrap();

        let renderer = session.renderer();
        assert_eq!(renderer.notices.len(), 1);
        assert_eq!(renderer.notices[0].slot, Some(1));
        assert_eq!(session.view().delta.traces, vec![previous]);
        assert_eq!(session.view().summaries[1].1.lap_number, 9);
    }

    #[test]
    fn test_unusable_reference_keeps_previous_delta() {
        let mut session = session(SessionKind::Qualifying);
        session.assign(0, lap("LEC", "Ferrari", 12, 1.0)).unwrap();
        session.assign(1, lap("NOR", "McLaren", 9, 1.1)).unwrap();
        let previous = session.view().delta.clone();

        let mut broken = lap("HAM", "Mercedes", 3, 1.0);
        broken.series.samples.truncate(1);
        session.assign(0, broken).unwrap();

        let renderer = session.renderer();
        assert_eq!(renderer.notices.len(), 1);
        assert_eq!(renderer.notices[0].slot, Some(0));
        assert!(renderer.notices[0].message.contains("HAM"));
        assert_eq!(session.view().delta, previous);
        assert_eq!(session.view().delta.reference_driver.as_deref(), Some("LEC"));
        assert_eq!(session.view().summaries[0].1.driver, "HAM");
    }

    #[test]
    fn test_trace_against_old_reference_is_dropped() {
        let mut session = session(SessionKind::Qualifying);
        session.assign(0, lap("LEC", "Ferrari", 12, 1.0)).unwrap();
        session.assign(1, lap("SAI", "Ferrari", 8, 1.2)).unwrap();

        let mut broken = lap("SAI", "Ferrari", 9, 1.2);
        broken.series.samples.truncate(1);
        session.assign(1, broken).unwrap();
        assert_eq!(session.view().delta.traces.len(), 1);
        assert_eq!(session.view().delta.traces[0].reference_driver, "LEC");

        session.assign(0, lap("NOR", "McLaren", 9, 1.1)).unwrap();

        let view = session.view();
        assert_eq!(view.delta.reference_driver.as_deref(), Some("NOR"));
        assert!(view.delta.traces.is_empty());
        assert!(view.delta.y_range.is_none());
        assert_eq!(session.renderer().notices.len(), 2);
        assert!(session.renderer().notices.iter().all(|n| n.slot == Some(1)));
    }

    #[test]
    fn test_clearing_every_slot_resets_the_view() {
        let mut session = session(SessionKind::Qualifying);
        session.assign(0, lap("LEC", "Ferrari", 12, 1.0)).unwrap();
        session.assign(1, lap("NOR", "McLaren", 9, 1.1)).unwrap();

        session.clear(0).unwrap();
        assert_eq!(session.view().delta.reference_driver.as_deref(), Some("NOR"));
        assert!(session.view().delta.traces.is_empty());

        session.clear(1).unwrap();
        let view = session.view();
        assert!(view.delta.reference_driver.is_none());
        assert_eq!(view.dominance.segments.len(), 3);
        assert!(view.dominance.segments.iter().all(|s| s.winner.is_none()));
        assert!(view.dominance.track_map.is_none());
        assert_eq!(view.dominance.corner_labels.len(), 1);
        assert!(session.renderer().notices.is_empty());

        // clearing an empty slot changes nothing
        let rendered = session.renderer().views.len();
        session.clear(1).unwrap();
        assert_eq!(session.renderer().views.len(), rendered);
    }

    #[test]
    fn test_out_of_range_slot_is_rejected() {
        let mut session = session(SessionKind::Race);
        assert!(matches!(
            session.assign(SLOT_COUNT, lap("HUL", "Haas", 3, 1.0)),
            Err(LapDeltaError::SlotOutOfRange { .. })
        ));
        assert!(session.renderer().views.is_empty());
        assert_eq!(session.bound_laps().count(), 0);
    }

    #[test]
    fn test_race_lap_one_is_lined_up_with_full_lap() {
        let mut session = session(SessionKind::Race);
        let mut first = lap("PIA", "McLaren", 1, 1.0);
        first.series.samples.retain(|s| s.distance <= 250.);
        session.assign(0, first).unwrap();

        let (_, bound) = session.bound_laps().next().unwrap();
        assert_eq!(bound.aligned.min_distance(), Some(50.));
        assert_eq!(bound.series.min_distance(), Some(0.));
        assert_eq!(bound.summary.sector_times[0], None);
        assert!(
            session
                .view()
                .dominance
                .segments
                .iter()
                .all(|s| s.winner.as_deref() == Some("PIA"))
        );
    }
}
