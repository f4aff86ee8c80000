//! The closed stream set of the plant, the split/mix topology, and the table that
//! names exactly one defining relation for every (stream, component) flow.
//!
//! Unit blocks never write flow equations directly: they go through
//! [`StreamNetwork::define_output`], which refuses any pair the definition table
//! does not assign to the calling unit. After every block has run,
//! [`StreamNetwork::verify_complete`] proves that no flow was left undefined.

use crate::error::MethforgeError;
use crate::model::{Expr, ModelBuilder, VarId};
use methforge_schemas::{
    component::{ComponentId, ComponentTable, ComponentVector},
    fan::FanType,
    technology::{AdsorptionTechnology, ElectrolyzerType, SteamLevel},
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier of a stream in the hand-designed flowsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StreamId(u16);

impl StreamId {
    pub const AIR_FEED: StreamId = StreamId(1);
    pub const FAN1_INLET: StreamId = StreamId(11);
    pub const FAN1_OUTLET: StreamId = StreamId(12);
    pub const FAN2_INLET: StreamId = StreamId(13);
    pub const FAN2_OUTLET: StreamId = StreamId(14);
    pub const FAN3_INLET: StreamId = StreamId(15);
    pub const FAN3_OUTLET: StreamId = StreamId(16);
    pub const WATER_FEED: StreamId = StreamId(2);
    pub const AEL_FEED: StreamId = StreamId(21);
    pub const AEL_HYDROGEN: StreamId = StreamId(22);
    pub const SOEL_FEED: StreamId = StreamId(23);
    pub const SOEL_HYDROGEN: StreamId = StreamId(24);
    pub const PEMEL_FEED: StreamId = StreamId(25);
    pub const PEMEL_HYDROGEN: StreamId = StreamId(26);
    pub const AEL_VENT: StreamId = StreamId(27);
    pub const PEMEL_VENT: StreamId = StreamId(28);
    pub const SOEL_VENT: StreamId = StreamId(29);
    pub const RESERVED_3: StreamId = StreamId(3);
    pub const RESERVED_4: StreamId = StreamId(4);
    pub const HYDROGEN: StreamId = StreamId(5);
    pub const DFM_HYDROGEN: StreamId = StreamId(51);
    pub const TVSA_HYDROGEN: StreamId = StreamId(52);
    pub const CAPTURE_AIR: StreamId = StreamId(6);
    pub const DFM_AIR: StreamId = StreamId(61);
    pub const DFM_LEAN_AIR: StreamId = StreamId(62);
    pub const DFM_CAPTURED: StreamId = StreamId(63);
    pub const TVSA_AIR: StreamId = StreamId(64);
    pub const TVSA_LEAN_AIR: StreamId = StreamId(65);
    pub const TVSA_CAPTURED: StreamId = StreamId(66);
    pub const DFM_REACTOR_FEED: StreamId = StreamId(635);
    pub const DFM_REACTOR_OUTLET: StreamId = StreamId(636);
    pub const TVSA_REACTOR_FEED: StreamId = StreamId(665);
    pub const TVSA_REACTOR_OUTLET: StreamId = StreamId(666);
    pub const PRODUCT: StreamId = StreamId(7);
    pub const BOILER_OUTLET: StreamId = StreamId(8);
    pub const COOLER_OUTLET: StreamId = StreamId(9);
    pub const LP_STEAM: StreamId = StreamId(91);
    pub const MP_STEAM: StreamId = StreamId(92);
    pub const HP_STEAM: StreamId = StreamId(93);
    pub const LP_EXPORT: StreamId = StreamId(94);
    pub const MP_EXPORT: StreamId = StreamId(95);
    pub const HP_EXPORT: StreamId = StreamId(96);
    pub const DRY_GAS: StreamId = StreamId(10);
    pub const CONDENSATE: StreamId = StreamId(20);

    pub const COUNT: usize = 44;

    /// Every stream, in flowsheet order.
    pub const ALL: [StreamId; Self::COUNT] = [
        Self::AIR_FEED,
        Self::FAN1_INLET,
        Self::FAN1_OUTLET,
        Self::FAN2_INLET,
        Self::FAN2_OUTLET,
        Self::FAN3_INLET,
        Self::FAN3_OUTLET,
        Self::WATER_FEED,
        Self::AEL_FEED,
        Self::AEL_HYDROGEN,
        Self::SOEL_FEED,
        Self::SOEL_HYDROGEN,
        Self::PEMEL_FEED,
        Self::PEMEL_HYDROGEN,
        Self::AEL_VENT,
        Self::PEMEL_VENT,
        Self::SOEL_VENT,
        Self::RESERVED_3,
        Self::RESERVED_4,
        Self::HYDROGEN,
        Self::DFM_HYDROGEN,
        Self::TVSA_HYDROGEN,
        Self::CAPTURE_AIR,
        Self::DFM_AIR,
        Self::DFM_LEAN_AIR,
        Self::DFM_CAPTURED,
        Self::TVSA_AIR,
        Self::TVSA_LEAN_AIR,
        Self::TVSA_CAPTURED,
        Self::DFM_REACTOR_FEED,
        Self::DFM_REACTOR_OUTLET,
        Self::TVSA_REACTOR_FEED,
        Self::TVSA_REACTOR_OUTLET,
        Self::PRODUCT,
        Self::BOILER_OUTLET,
        Self::COOLER_OUTLET,
        Self::LP_STEAM,
        Self::MP_STEAM,
        Self::HP_STEAM,
        Self::LP_EXPORT,
        Self::MP_EXPORT,
        Self::HP_EXPORT,
        Self::DRY_GAS,
        Self::CONDENSATE,
    ];

    /// Looks up a stream by its flowsheet number.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::UnknownStream` for numbers outside the flowsheet.
    pub fn new(number: u16) -> Result<Self, MethforgeError> {
        Self::ALL
            .into_iter()
            .find(|s| s.0 == number)
            .ok_or(MethforgeError::UnknownStream(number))
    }

    pub fn number(self) -> u16 {
        self.0
    }

    /// Position in [`StreamId::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(Self::COUNT)
    }

    pub fn fan_inlet(fan: FanType) -> Self {
        match fan {
            FanType::CentrifugalBackwardCurved => Self::FAN1_INLET,
            FanType::CentrifugalStraightRadial => Self::FAN2_INLET,
            FanType::VaneAxial => Self::FAN3_INLET,
        }
    }

    pub fn fan_outlet(fan: FanType) -> Self {
        match fan {
            FanType::CentrifugalBackwardCurved => Self::FAN1_OUTLET,
            FanType::CentrifugalStraightRadial => Self::FAN2_OUTLET,
            FanType::VaneAxial => Self::FAN3_OUTLET,
        }
    }

    pub fn electrolyzer_feed(kind: ElectrolyzerType) -> Self {
        match kind {
            ElectrolyzerType::Ael => Self::AEL_FEED,
            ElectrolyzerType::Soel => Self::SOEL_FEED,
            ElectrolyzerType::Pemel => Self::PEMEL_FEED,
        }
    }

    pub fn electrolyzer_hydrogen(kind: ElectrolyzerType) -> Self {
        match kind {
            ElectrolyzerType::Ael => Self::AEL_HYDROGEN,
            ElectrolyzerType::Soel => Self::SOEL_HYDROGEN,
            ElectrolyzerType::Pemel => Self::PEMEL_HYDROGEN,
        }
    }

    pub fn electrolyzer_vent(kind: ElectrolyzerType) -> Self {
        match kind {
            ElectrolyzerType::Ael => Self::AEL_VENT,
            ElectrolyzerType::Soel => Self::SOEL_VENT,
            ElectrolyzerType::Pemel => Self::PEMEL_VENT,
        }
    }

    pub fn steam(level: SteamLevel) -> Self {
        match level {
            SteamLevel::Low => Self::LP_STEAM,
            SteamLevel::Medium => Self::MP_STEAM,
            SteamLevel::High => Self::HP_STEAM,
        }
    }

    pub fn steam_export(level: SteamLevel) -> Self {
        match level {
            SteamLevel::Low => Self::LP_EXPORT,
            SteamLevel::Medium => Self::MP_EXPORT,
            SteamLevel::High => Self::HP_EXPORT,
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Streams around one capture route, from the air branch to the reactor outlet.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRoute {
    pub air: StreamId,
    pub lean_air: StreamId,
    pub captured: StreamId,
    pub hydrogen: StreamId,
    pub reactor_feed: StreamId,
    pub reactor_outlet: StreamId,
}

impl CaptureRoute {
    pub fn of(technology: AdsorptionTechnology) -> Self {
        match technology {
            AdsorptionTechnology::Dfm => Self {
                air: StreamId::DFM_AIR,
                lean_air: StreamId::DFM_LEAN_AIR,
                captured: StreamId::DFM_CAPTURED,
                hydrogen: StreamId::DFM_HYDROGEN,
                reactor_feed: StreamId::DFM_REACTOR_FEED,
                reactor_outlet: StreamId::DFM_REACTOR_OUTLET,
            },
            AdsorptionTechnology::Tvsa => Self {
                air: StreamId::TVSA_AIR,
                lean_air: StreamId::TVSA_LEAN_AIR,
                captured: StreamId::TVSA_CAPTURED,
                hydrogen: StreamId::TVSA_HYDROGEN,
                reactor_feed: StreamId::TVSA_REACTOR_FEED,
                reactor_outlet: StreamId::TVSA_REACTOR_OUTLET,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    AirSplit,
    CaptureAirMix,
    AdsorptionSplit,
    WaterSplit,
    HydrogenMix,
    HydrogenSplit,
    DfmFeedMix,
    TvsaFeedMix,
    ProductMix,
}

impl NodeId {
    pub fn label(self) -> &'static str {
        match self {
            NodeId::AirSplit => "air_split",
            NodeId::CaptureAirMix => "capture_air_mix",
            NodeId::AdsorptionSplit => "adsorption_split",
            NodeId::WaterSplit => "water_split",
            NodeId::HydrogenMix => "hydrogen_mix",
            NodeId::HydrogenSplit => "hydrogen_split",
            NodeId::DfmFeedMix => "dfm_feed_mix",
            NodeId::TvsaFeedMix => "tvsa_feed_mix",
            NodeId::ProductMix => "product_mix",
        }
    }
}

/// Process units that own the outlet flows they compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitId {
    FanSystem(FanType),
    Electrolyzer(ElectrolyzerType),
    Adsorber(AdsorptionTechnology),
    Reactor(AdsorptionTechnology),
    SteamGenerator,
    AirCooler,
    Separator,
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::FanSystem(fan) => write!(f, "fan.{}", fan.tag()),
            UnitId::Electrolyzer(kind) => write!(f, "electrolyzer.{}", kind.label()),
            UnitId::Adsorber(tech) => write!(f, "adsorber.{}", tech.label()),
            UnitId::Reactor(tech) => write!(f, "reactor.{}", tech.label()),
            UnitId::SteamGenerator => write!(f, "steam"),
            UnitId::AirCooler => write!(f, "air_cooler"),
            UnitId::Separator => write!(f, "separator"),
        }
    }
}

/// The relation that defines one (stream, component) flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowDefinition {
    PinnedInitial(f64),
    Zero,
    /// A feed whose flow the solver chooses to meet downstream demand.
    FreeFeed,
    NodeBalance(NodeId),
    UnitOutput(UnitId),
}

impl fmt::Display for FlowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDefinition::PinnedInitial(v) => write!(f, "pinned to {v}"),
            FlowDefinition::Zero => write!(f, "zero"),
            FlowDefinition::FreeFeed => write!(f, "free feed"),
            FlowDefinition::NodeBalance(node) => write!(f, "balance of {}", node.label()),
            FlowDefinition::UnitOutput(unit) => write!(f, "output of {unit}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `trunk = Σ branches`, each branch gated by the option it feeds.
    Splitter,
    /// `Σ branches = trunk`.
    Mixer,
}

/// Technology option a splitter branch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchGate {
    Fan(FanType),
    Electrolyzer(ElectrolyzerType),
    Adsorption(AdsorptionTechnology),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    pub kind: NodeKind,
    pub trunk: StreamId,
    pub branches: Vec<(StreamId, Option<BranchGate>)>,
}

impl NodeSpec {
    fn splitter(id: NodeId, trunk: StreamId, branches: Vec<(StreamId, BranchGate)>) -> Self {
        Self {
            id,
            kind: NodeKind::Splitter,
            trunk,
            branches: branches.into_iter().map(|(s, g)| (s, Some(g))).collect(),
        }
    }

    fn mixer(id: NodeId, trunk: StreamId, branches: &[StreamId]) -> Self {
        Self {
            id,
            kind: NodeKind::Mixer,
            trunk,
            branches: branches.iter().map(|s| (*s, None)).collect(),
        }
    }

    /// Streams whose flows this node's balance defines.
    pub fn defined_streams(&self) -> Vec<StreamId> {
        match self.kind {
            NodeKind::Splitter => self.branches.iter().map(|(s, _)| *s).collect(),
            NodeKind::Mixer => vec![self.trunk],
        }
    }
}

/// Split and mix nodes of the flowsheet.
pub fn plant_nodes() -> Vec<NodeSpec> {
    use AdsorptionTechnology::{Dfm, Tvsa};
    vec![
        NodeSpec::splitter(
            NodeId::AirSplit,
            StreamId::AIR_FEED,
            FanType::ALL
                .into_iter()
                .map(|f| (StreamId::fan_inlet(f), BranchGate::Fan(f)))
                .collect(),
        ),
        NodeSpec::mixer(
            NodeId::CaptureAirMix,
            StreamId::CAPTURE_AIR,
            &FanType::ALL.map(StreamId::fan_outlet),
        ),
        NodeSpec::splitter(
            NodeId::AdsorptionSplit,
            StreamId::CAPTURE_AIR,
            vec![
                (StreamId::DFM_AIR, BranchGate::Adsorption(Dfm)),
                (StreamId::TVSA_AIR, BranchGate::Adsorption(Tvsa)),
            ],
        ),
        NodeSpec::splitter(
            NodeId::WaterSplit,
            StreamId::WATER_FEED,
            ElectrolyzerType::ALL
                .into_iter()
                .map(|e| (StreamId::electrolyzer_feed(e), BranchGate::Electrolyzer(e)))
                .collect(),
        ),
        NodeSpec::mixer(
            NodeId::HydrogenMix,
            StreamId::HYDROGEN,
            &ElectrolyzerType::ALL.map(StreamId::electrolyzer_hydrogen),
        ),
        NodeSpec::splitter(
            NodeId::HydrogenSplit,
            StreamId::HYDROGEN,
            vec![
                (StreamId::DFM_HYDROGEN, BranchGate::Adsorption(Dfm)),
                (StreamId::TVSA_HYDROGEN, BranchGate::Adsorption(Tvsa)),
            ],
        ),
        NodeSpec::mixer(
            NodeId::DfmFeedMix,
            StreamId::DFM_REACTOR_FEED,
            &[StreamId::DFM_CAPTURED, StreamId::DFM_HYDROGEN],
        ),
        NodeSpec::mixer(
            NodeId::TvsaFeedMix,
            StreamId::TVSA_REACTOR_FEED,
            &[StreamId::TVSA_CAPTURED, StreamId::TVSA_HYDROGEN],
        ),
        NodeSpec::mixer(
            NodeId::ProductMix,
            StreamId::PRODUCT,
            &[StreamId::DFM_REACTOR_OUTLET, StreamId::TVSA_REACTOR_OUTLET],
        ),
    ]
}

/// (stream, component) → defining relation, checked for overlap on insert and
/// for completeness by [`DefinitionTable::validate`].
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    entries: BTreeMap<(StreamId, ComponentId), FlowDefinition>,
}

impl DefinitionTable {
    /// # Errors
    ///
    /// Returns `MethforgeError::DuplicateDefinition` if the pair already has a relation.
    pub fn insert(&mut self, stream: StreamId, component: ComponentId, definition: FlowDefinition) -> Result<(), MethforgeError> {
        if let Some(first) = self.entries.get(&(stream, component)) {
            return Err(MethforgeError::DuplicateDefinition {
                stream: stream.number(),
                component: component.label(),
                first: first.to_string(),
                second: definition.to_string(),
            });
        }
        self.entries.insert((stream, component), definition);
        Ok(())
    }

    fn insert_all(&mut self, stream: StreamId, definition: FlowDefinition) -> Result<(), MethforgeError> {
        for c in ComponentId::ALL {
            self.insert(stream, c, definition)?;
        }
        Ok(())
    }

    pub fn get(&self, stream: StreamId, component: ComponentId) -> Option<FlowDefinition> {
        self.entries.get(&(stream, component)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StreamId, ComponentId, FlowDefinition)> + '_ {
        self.entries.iter().map(|(&(s, c), &d)| (s, c, d))
    }

    /// Every pair of the closed stream set must carry a relation.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::MissingDefinition` naming the first uncovered pair.
    pub fn validate(&self) -> Result<(), MethforgeError> {
        for s in StreamId::ALL {
            for c in ComponentId::ALL {
                if !self.entries.contains_key(&(s, c)) {
                    return Err(MethforgeError::MissingDefinition {
                        stream: s.number(),
                        component: c.label(),
                        expected: "any relation".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The plant's table for a given air intake.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if the layout assigns a pair twice or misses one.
    pub fn plant(feed: &ComponentVector) -> Result<Self, MethforgeError> {
        use ComponentId::H2o;
        use FlowDefinition::{NodeBalance, UnitOutput, Zero};

        let mut table = Self::default();
        for c in ComponentId::ALL {
            table.insert(StreamId::AIR_FEED, c, FlowDefinition::PinnedInitial(feed[c]))?;
            let water = if c == H2o { FlowDefinition::FreeFeed } else { Zero };
            table.insert(StreamId::WATER_FEED, c, water)?;
        }
        table.insert_all(StreamId::RESERVED_3, Zero)?;
        table.insert_all(StreamId::RESERVED_4, Zero)?;

        for node in plant_nodes() {
            for s in node.defined_streams() {
                table.insert_all(s, NodeBalance(node.id))?;
            }
        }

        for fan in FanType::ALL {
            table.insert_all(StreamId::fan_outlet(fan), UnitOutput(UnitId::FanSystem(fan)))?;
        }
        for kind in ElectrolyzerType::ALL {
            let unit = UnitOutput(UnitId::Electrolyzer(kind));
            table.insert_all(StreamId::electrolyzer_hydrogen(kind), unit)?;
            table.insert_all(StreamId::electrolyzer_vent(kind), unit)?;
        }
        for tech in AdsorptionTechnology::ALL {
            let route = CaptureRoute::of(tech);
            table.insert_all(route.lean_air, UnitOutput(UnitId::Adsorber(tech)))?;
            table.insert_all(route.captured, UnitOutput(UnitId::Adsorber(tech)))?;
            table.insert_all(route.reactor_outlet, UnitOutput(UnitId::Reactor(tech)))?;
        }

        let steam = UnitOutput(UnitId::SteamGenerator);
        table.insert_all(StreamId::BOILER_OUTLET, steam)?;
        for level in SteamLevel::ALL {
            for c in ComponentId::ALL {
                let def = if c == H2o { steam } else { Zero };
                table.insert(StreamId::steam(level), c, def)?;
            }
            table.insert_all(StreamId::steam_export(level), steam)?;
        }
        table.insert_all(StreamId::COOLER_OUTLET, UnitOutput(UnitId::AirCooler))?;
        table.insert_all(StreamId::DRY_GAS, UnitOutput(UnitId::Separator))?;
        table.insert_all(StreamId::CONDENSATE, UnitOutput(UnitId::Separator))?;

        table.validate()?;
        log::debug!("Definition table covers {} flows", table.entries.len());
        Ok(table)
    }
}

/// Flow variables of every (stream, component) pair plus the bookkeeping that
/// tracks which of them have received their defining relation.
#[derive(Debug, Clone)]
pub struct StreamNetwork {
    flows: Vec<VarId>,
    table: DefinitionTable,
    realised: BTreeSet<(StreamId, ComponentId)>,
    nodes: Vec<NodeSpec>,
}

impl StreamNetwork {
    /// Declares one flow variable per pair on `[0, flow_upper]` and emits the
    /// pinned-initial and zero relations.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if a pinned feed falls outside the flow bounds.
    pub fn declare(builder: &mut ModelBuilder, table: DefinitionTable, flow_upper: f64) -> Result<Self, MethforgeError> {
        let mut flows = Vec::with_capacity(StreamId::COUNT * ComponentId::COUNT);
        for s in StreamId::ALL {
            for c in ComponentId::ALL {
                flows.push(builder.continuous(format!("x[{s},{}]", c.label()), 0.0, flow_upper)?);
            }
        }
        let mut network = Self {
            flows,
            table,
            realised: BTreeSet::new(),
            nodes: Vec::new(),
        };

        let fixed: Vec<_> = network.table.iter().collect();
        for (s, c, def) in fixed {
            match def {
                FlowDefinition::PinnedInitial(value) => {
                    builder.pin(format!("init[{s},{}]", c.label()), network.var(s, c), value)?;
                    network.realised.insert((s, c));
                }
                FlowDefinition::Zero => {
                    builder.equal(format!("zero[{s},{}]", c.label()), network.var(s, c), 0.0)?;
                    network.realised.insert((s, c));
                }
                FlowDefinition::FreeFeed => {
                    network.realised.insert((s, c));
                }
                FlowDefinition::NodeBalance(_) | FlowDefinition::UnitOutput(_) => {}
            }
        }
        Ok(network)
    }

    pub fn var(&self, stream: StreamId, component: ComponentId) -> VarId {
        self.flows[stream.index() * ComponentId::COUNT + component.index()]
    }

    pub fn x(&self, stream: StreamId, component: ComponentId) -> Expr {
        Expr::Var(self.var(stream, component))
    }

    pub fn table(&self) -> &DefinitionTable {
        &self.table
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Emits `trunk = Σ branches` for every component and marks the streams the
    /// node defines.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if the table assigns those streams elsewhere.
    pub fn attach_node(&mut self, builder: &mut ModelBuilder, node: &NodeSpec) -> Result<(), MethforgeError> {
        for s in node.defined_streams() {
            for c in ComponentId::ALL {
                self.claim(s, c, FlowDefinition::NodeBalance(node.id))?;
            }
        }
        for c in ComponentId::ALL {
            let inflow = Expr::sum(node.branches.iter().map(|(s, _)| self.x(*s, c)));
            builder.equal(
                format!("{}.balance[{}]", node.id.label(), c.label()),
                self.x(node.trunk, c),
                inflow,
            )?;
        }
        self.nodes.push(node.clone());
        Ok(())
    }

    /// Emits `x[stream, component] = value` on behalf of `unit`.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::DuplicateDefinition` when the table gives the pair
    /// to another relation or the unit already defined it.
    pub fn define_output(
        &mut self,
        builder: &mut ModelBuilder,
        unit: UnitId,
        stream: StreamId,
        component: ComponentId,
        value: impl Into<Expr>,
    ) -> Result<(), MethforgeError> {
        self.claim(stream, component, FlowDefinition::UnitOutput(unit))?;
        builder.equal(
            format!("{unit}.out[{stream},{}]", component.label()),
            self.x(stream, component),
            value,
        )
    }

    /// Zeroes every output of a unit that the selection has ruled out.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if one of those outputs was already defined.
    pub fn retire_unit(&mut self, builder: &mut ModelBuilder, unit: UnitId) -> Result<(), MethforgeError> {
        let owned: Vec<_> = self
            .table
            .iter()
            .filter(|(_, _, def)| *def == FlowDefinition::UnitOutput(unit))
            .map(|(s, c, _)| (s, c))
            .collect();
        for (s, c) in owned {
            self.define_output(builder, unit, s, c, 0.0)?;
        }
        log::debug!("Retired {unit}: outputs pinned to zero");
        Ok(())
    }

    fn claim(&mut self, stream: StreamId, component: ComponentId, by: FlowDefinition) -> Result<(), MethforgeError> {
        let expected = self.table.get(stream, component).ok_or(MethforgeError::MissingDefinition {
            stream: stream.number(),
            component: component.label(),
            expected: by.to_string(),
        })?;
        if expected != by || !self.realised.insert((stream, component)) {
            return Err(MethforgeError::DuplicateDefinition {
                stream: stream.number(),
                component: component.label(),
                first: expected.to_string(),
                second: by.to_string(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `MethforgeError::MissingDefinition` for the first pair whose
    /// relation was never emitted.
    pub fn verify_complete(&self) -> Result<(), MethforgeError> {
        match self.table.iter().find(|(s, c, _)| !self.realised.contains(&(*s, *c))) {
            Some((s, c, def)) => Err(MethforgeError::MissingDefinition {
                stream: s.number(),
                component: c.label(),
                expected: def.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Volumetric flow of `stream` in m3/s from the component densities.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::MissingProperty` if a component has no record.
    pub fn volumetric_flow(&self, stream: StreamId, components: &ComponentTable) -> Result<Expr, MethforgeError> {
        let mut terms = Vec::with_capacity(ComponentId::COUNT);
        for c in ComponentId::ALL {
            let props = property(components, c)?;
            terms.push(self.x(stream, c) * (props.molar_mass / props.density / 3600.0));
        }
        Ok(Expr::sum(terms))
    }

    /// `Σ x[stream, c]·cp[c]`, kJ/(h·°C).
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::MissingProperty` if a component has no record.
    pub fn heat_capacity_rate(&self, stream: StreamId, components: &ComponentTable) -> Result<Expr, MethforgeError> {
        let mut terms = Vec::with_capacity(ComponentId::COUNT);
        for c in ComponentId::ALL {
            terms.push(self.x(stream, c) * property(components, c)?.heat_capacity);
        }
        Ok(Expr::sum(terms))
    }
}

pub(crate) fn property(
    components: &ComponentTable,
    c: ComponentId,
) -> Result<&methforge_schemas::component::Component, MethforgeError> {
    components.get(c).ok_or_else(|| MethforgeError::MissingProperty {
        kind: "component",
        key: c.label().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use methforge_schemas::component::reference_air_feed;

    #[test]
    fn stream_numbers_round_trip() {
        for (i, s) in StreamId::ALL.iter().enumerate() {
            assert_eq!(StreamId::new(s.number()).unwrap(), *s);
            assert_eq!(s.index(), i);
        }
        assert!(matches!(StreamId::new(17), Err(MethforgeError::UnknownStream(17))));
    }

    #[test]
    fn plant_table_is_complete() {
        let table = DefinitionTable::plant(&reference_air_feed()).unwrap();
        assert_eq!(table.iter().count(), StreamId::COUNT * ComponentId::COUNT);
        assert_eq!(table.get(StreamId::RESERVED_3, ComponentId::Co2), Some(FlowDefinition::Zero));
        assert_eq!(table.get(StreamId::WATER_FEED, ComponentId::H2o), Some(FlowDefinition::FreeFeed));
        assert_eq!(table.get(StreamId::LP_STEAM, ComponentId::N2), Some(FlowDefinition::Zero));
        assert_eq!(
            table.get(StreamId::AIR_FEED, ComponentId::N2),
            Some(FlowDefinition::PinnedInitial(51226.0))
        );
    }

    #[test]
    fn overlapping_definitions_are_rejected() {
        let mut table = DefinitionTable::default();
        table.insert(StreamId::PRODUCT, ComponentId::Ch4, FlowDefinition::Zero).unwrap();
        let err = table
            .insert(StreamId::PRODUCT, ComponentId::Ch4, FlowDefinition::NodeBalance(NodeId::ProductMix))
            .unwrap_err();
        assert!(matches!(err, MethforgeError::DuplicateDefinition { stream: 7, .. }));
    }

    #[test]
    fn incomplete_table_fails_validation() {
        let mut table = DefinitionTable::default();
        table.insert(StreamId::AIR_FEED, ComponentId::Co2, FlowDefinition::Zero).unwrap();
        assert!(matches!(table.validate(), Err(MethforgeError::MissingDefinition { .. })));
    }

    #[test]
    fn units_may_only_define_their_own_outputs() {
        let mut b = ModelBuilder::new("t");
        let table = DefinitionTable::plant(&reference_air_feed()).unwrap();
        let mut net = StreamNetwork::declare(&mut b, table, 1e5).unwrap();
        let unit = UnitId::AirCooler;
        let err = net
            .define_output(&mut b, unit, StreamId::PRODUCT, ComponentId::Co2, 0.0)
            .unwrap_err();
        assert!(matches!(err, MethforgeError::DuplicateDefinition { .. }));

        let inflow = net.x(StreamId::BOILER_OUTLET, ComponentId::Co2);
        net.define_output(&mut b, unit, StreamId::COOLER_OUTLET, ComponentId::Co2, inflow.clone())
            .unwrap();
        let again = net.define_output(&mut b, unit, StreamId::COOLER_OUTLET, ComponentId::Co2, inflow);
        assert!(again.is_err());
        assert!(matches!(net.verify_complete(), Err(MethforgeError::MissingDefinition { .. })));
    }
}
