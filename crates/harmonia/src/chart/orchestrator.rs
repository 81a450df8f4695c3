use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aspects::calculator::AspectCalculator;
use crate::aspects::types::{AspectConfig, AspectSet};
use crate::chart::render::{ChartKind, ChartRenderer, RenderError, RenderOptions, RenderRequest, RenderedChart};
use crate::chart::result::{
    CompositeAspects, NatalAspects, Rendered, ScoreReport, SynastryAspects, TransitAspects,
};
use crate::chart::subject::{Place, Subject, TransitMoment};
use crate::composite::CompositeCalculator;
use crate::ephemeris::houses::GeometricHouses;
use crate::ephemeris::provider::{EphemerisProvider, EphemerisRequest, Geocoder, HouseCalculator, LookupError};
use crate::ephemeris::types::{greenwich, ChartConfig, ChartMoment, PositionSet, ResolvedPlace};
use crate::error::{EngineError, Result};
use crate::score::{destiny_sign, PointRoles, RelationshipScore, RelationshipScorer, WeightTable};

/// Name given to "current sky" position sets
pub const NOW_SUBJECT: &str = "Now";

/// Engine-wide settings shared by every chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Configuration for charts that have no subject of their own
    pub chart: ChartConfig,
    pub aspects: AspectConfig,
    pub weights: WeightTable,
    pub roles: PointRoles,
    pub render: RenderOptions,
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        self.chart.validate()?;
        self.aspects.validate()?;
        self.weights.validate()
    }
}

/// Composes ephemeris lookups, aspect calculation, composites, scoring and
/// rendering per chart type.
pub struct ChartOrchestrator {
    ephemeris: Arc<dyn EphemerisProvider>,
    geocoder: Option<Arc<dyn Geocoder>>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    houses: Arc<dyn HouseCalculator>,
    settings: EngineSettings,
    calculator: AspectCalculator,
    composite: CompositeCalculator,
    scorer: RelationshipScorer,
}

impl ChartOrchestrator {
    pub fn new(ephemeris: Arc<dyn EphemerisProvider>) -> Self {
        Self {
            ephemeris,
            geocoder: None,
            renderer: None,
            houses: Arc::new(GeometricHouses::new()),
            settings: EngineSettings::default(),
            calculator: AspectCalculator::new(),
            composite: CompositeCalculator::new(),
            scorer: RelationshipScorer::new(),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_houses(mut self, houses: Arc<dyn HouseCalculator>) -> Self {
        self.houses = houses;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Positions of one subject, without aspects.
    pub async fn birth_data(&self, subject: &Subject) -> Result<PositionSet> {
        log::debug!("Birth data for {}", subject.name);
        self.positions_for(subject).await
    }

    /// Positions for `now` as seen from Greenwich.
    pub async fn current_sky(&self, now: DateTime<Utc>) -> Result<PositionSet> {
        let place = greenwich();
        let subject = Subject::new(
            NOW_SUBJECT,
            now.naive_utc(),
            Place::coordinates(place.location.lat, place.location.lon, place.timezone),
        )
        .with_config(self.settings.chart);
        log::debug!("Current sky at {}", now);
        self.positions_for(&subject).await
    }

    /// Self-aspects of one subject. `aspects` overrides the configured
    /// aspect selection for this call.
    pub async fn birth_aspects(
        &self,
        subject: &Subject,
        aspects: Option<&AspectConfig>,
    ) -> Result<NatalAspects> {
        log::debug!("Natal aspects for {}", subject.name);
        let positions = self.positions_for(subject).await?;
        let aspects = self
            .calculator
            .self_aspects(&positions, self.aspect_config(aspects))?;
        Ok(NatalAspects { positions, aspects })
    }

    pub async fn birth_chart(
        &self,
        subject: &Subject,
        aspects: Option<&AspectConfig>,
    ) -> Result<Rendered<NatalAspects>> {
        let renderer = self.renderer_for(ChartKind::Natal)?;
        let chart = self.birth_aspects(subject, aspects).await?;
        let rendering = self
            .render(renderer, ChartKind::Natal, vec![&chart.positions], &chart.aspects)
            .await?;
        Ok(Rendered { chart, rendering })
    }

    /// Cross aspects between two subjects, with their relationship score
    /// when `include_score` is set.
    pub async fn synastry_aspects(
        &self,
        first: &Subject,
        second: &Subject,
        include_score: bool,
        aspects: Option<&AspectConfig>,
    ) -> Result<SynastryAspects> {
        log::debug!("Synastry aspects for {} and {}", first.name, second.name);
        let set_a = self.positions_for(first).await?;
        let set_b = self.positions_for(second).await?;
        let aspects = self
            .calculator
            .cross_aspects(&set_a, &set_b, self.aspect_config(aspects))?;
        let score = if include_score {
            Some(self.score_sets(&set_a, &set_b, &aspects)?)
        } else {
            None
        };
        Ok(SynastryAspects {
            first: set_a,
            second: set_b,
            aspects,
            score,
        })
    }

    pub async fn synastry_chart(
        &self,
        first: &Subject,
        second: &Subject,
        include_score: bool,
        aspects: Option<&AspectConfig>,
    ) -> Result<Rendered<SynastryAspects>> {
        let renderer = self.renderer_for(ChartKind::Synastry)?;
        let chart = self
            .synastry_aspects(first, second, include_score, aspects)
            .await?;
        let rendering = self
            .render(
                renderer,
                ChartKind::Synastry,
                vec![&chart.first, &chart.second],
                &chart.aspects,
            )
            .await?;
        Ok(Rendered { chart, rendering })
    }

    /// Score with both subjects' positions; no aspect set or rendering is
    /// returned.
    pub async fn relationship_score(
        &self,
        first: &Subject,
        second: &Subject,
        aspects: Option<&AspectConfig>,
    ) -> Result<ScoreReport> {
        log::debug!("Relationship score for {} and {}", first.name, second.name);
        let set_a = self.positions_for(first).await?;
        let set_b = self.positions_for(second).await?;
        let cross = self
            .calculator
            .cross_aspects(&set_a, &set_b, self.aspect_config(aspects))?;
        let score = self.score_sets(&set_a, &set_b, &cross)?;
        Ok(ScoreReport {
            first: set_a,
            second: set_b,
            score,
        })
    }

    /// Natal positions against the sky at `moment`, cast with the natal
    /// configuration.
    pub async fn transit_aspects(
        &self,
        natal: &Subject,
        moment: &TransitMoment,
        aspects: Option<&AspectConfig>,
    ) -> Result<TransitAspects> {
        log::debug!("Transit aspects for {} at {}", natal.name, moment.local_datetime);
        let transit_subject = moment.subject_for(natal);
        let natal_set = self.positions_for(natal).await?;
        let transit_set = self.positions_for(&transit_subject).await?;
        let aspects = self.calculator.cross_aspects(
            &natal_set,
            &transit_set,
            self.aspect_config(aspects),
        )?;
        Ok(TransitAspects {
            natal: natal_set,
            transit: transit_set,
            aspects,
        })
    }

    pub async fn transit_chart(
        &self,
        natal: &Subject,
        moment: &TransitMoment,
        aspects: Option<&AspectConfig>,
    ) -> Result<Rendered<TransitAspects>> {
        let renderer = self.renderer_for(ChartKind::Transit)?;
        let chart = self.transit_aspects(natal, moment, aspects).await?;
        let rendering = self
            .render(
                renderer,
                ChartKind::Transit,
                vec![&chart.natal, &chart.transit],
                &chart.aspects,
            )
            .await?;
        Ok(Rendered { chart, rendering })
    }

    pub async fn composite_aspects(
        &self,
        first: &Subject,
        second: &Subject,
        aspects: Option<&AspectConfig>,
    ) -> Result<CompositeAspects> {
        log::debug!("Composite aspects for {} and {}", first.name, second.name);
        if first.config != second.config {
            return Err(EngineError::configuration(format!(
                "composite of {} and {} needs matching chart configurations",
                first.name, second.name
            )));
        }
        let set_a = self.positions_for(first).await?;
        let set_b = self.positions_for(second).await?;
        let composite = self
            .composite
            .compute_composite(&set_a, &set_b, self.houses.as_ref())?;
        let aspects = self
            .calculator
            .self_aspects(&composite, self.aspect_config(aspects))?;
        Ok(CompositeAspects {
            first: set_a,
            second: set_b,
            composite,
            aspects,
        })
    }

    pub async fn composite_chart(
        &self,
        first: &Subject,
        second: &Subject,
        aspects: Option<&AspectConfig>,
    ) -> Result<Rendered<CompositeAspects>> {
        let renderer = self.renderer_for(ChartKind::Composite)?;
        let chart = self.composite_aspects(first, second, aspects).await?;
        let rendering = self
            .render(
                renderer,
                ChartKind::Composite,
                vec![&chart.composite],
                &chart.aspects,
            )
            .await?;
        Ok(Rendered { chart, rendering })
    }

    fn aspect_config<'a>(&'a self, aspects: Option<&'a AspectConfig>) -> &'a AspectConfig {
        aspects.unwrap_or(&self.settings.aspects)
    }

    fn score_sets(
        &self,
        set_a: &PositionSet,
        set_b: &PositionSet,
        aspects: &AspectSet,
    ) -> Result<RelationshipScore> {
        let weights = &self.settings.weights;
        let roles: &PointRoles = &self.settings.roles;
        let score = self.scorer.compute_score(aspects, roles, roles, weights)?;
        let score = if destiny_sign(set_a, set_b) {
            score.with_destiny_sign(weights.destiny_sign_bonus)
        } else {
            score
        };
        log::debug!(
            "Score for {} and {}: {} ({})",
            set_a.subject(),
            set_b.subject(),
            score.value,
            score.band
        );
        Ok(score)
    }

    async fn resolve_place(&self, subject: &Subject) -> Result<ResolvedPlace> {
        if let Some(place) = subject.place.resolved()? {
            return Ok(place);
        }
        let Place::City { city, nation } = &subject.place else {
            return Err(EngineError::invalid(format!(
                "no place given for {}",
                subject.name
            )));
        };
        let lookup_error = |source: LookupError| {
            log::warn!("Place lookup for {} failed: {}", subject.name, source);
            EngineError::Lookup {
                subject: subject.name.clone(),
                source,
            }
        };
        let geocoder = self
            .geocoder
            .as_ref()
            .ok_or_else(|| lookup_error(LookupError::NotConfigured))?;
        geocoder.resolve(city, nation).await.map_err(lookup_error)
    }

    async fn positions_for(&self, subject: &Subject) -> Result<PositionSet> {
        subject.validate()?;
        let place = self.resolve_place(subject).await?;
        let request = EphemerisRequest {
            subject: subject.name.clone(),
            local: subject.local_datetime,
            place: place.clone(),
            config: subject.config,
            points: Vec::new(),
        };

        let positions = self.ephemeris.positions(&request).await.map_err(|source| {
            log::warn!(
                "Ephemeris lookup for {} at {} failed: {}",
                subject.name,
                subject.local_datetime,
                source
            );
            EngineError::Ephemeris {
                subject: subject.name.clone(),
                moment: subject.local_datetime.to_string(),
                source,
            }
        })?;

        if positions.config() != &subject.config {
            return Err(EngineError::configuration(format!(
                "ephemeris returned positions for {} computed with {:?}, requested {:?}",
                subject.name,
                positions.config(),
                subject.config
            )));
        }

        if positions.moment().is_some() {
            return Ok(positions);
        }
        Ok(positions.with_moment(ChartMoment {
            local: subject.local_datetime,
            place,
        }))
    }

    fn renderer_for(&self, kind: ChartKind) -> Result<&Arc<dyn ChartRenderer>> {
        self.renderer.as_ref().ok_or(EngineError::Render {
            chart: kind,
            source: RenderError::NotConfigured,
        })
    }

    async fn render(
        &self,
        renderer: &Arc<dyn ChartRenderer>,
        kind: ChartKind,
        positions: Vec<&PositionSet>,
        aspects: &AspectSet,
    ) -> Result<RenderedChart> {
        let request = RenderRequest {
            kind,
            positions,
            aspects,
            options: self.settings.render,
        };
        renderer.render(&request).await.map_err(|source| {
            log::warn!("Rendering the {} chart failed: {}", kind, source);
            EngineError::Render {
                chart: kind,
                source,
            }
        })
    }
}
