//! Composition of a focus pathway and its context pathways into one node/edge view.
//!
//! [PathwayComposer] owns the display layout (which pathways are shown and which node is the focus)
//! and rebuilds the whole [Composition] on every change. A pass walks through
//! [PassState::CollectingSourceGraphs] and [PassState::ExtractingEnvironments], then alternates
//! [PassState::MergingNodes] and [PassState::ComposingEdges] once per displayed pathway. The result
//! is committed only when the pass succeeds; on error the previous composition stays in place.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    config::{ComposerConfig, CompositionOption},
    environment::EnvironmentExtractor,
    error::PathwayError,
    event::{PathwayRole, ViewEvent},
    merge::{merge_nodes, MergeTarget, Node},
    pathway::{CommonEntityFilter, PathwayGraph, PathwayStore},
    properties::{union_entities, Nid, Pid, VertexRep, Vid},
    redirect::{compose_edges_for_graph, redirect, NodeEdge, NodeEdgeSet, UnresolvedEntity},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassState {
    #[default]
    Idle,
    CollectingSourceGraphs,
    ExtractingEnvironments,
    MergingNodes,
    ComposingEdges,
    Done,
}

/// A pathway as it is shown: either the stored pathway or a bounded subpathway of it.
#[derive(Debug, Clone)]
pub struct DisplayedPathway {
    pub graph: Arc<PathwayGraph>,
    pub role: PathwayRole,
    /// The focus was absent from the pathway, so it is shown unbounded.
    pub could_not_focus: bool,
}

impl DisplayedPathway {
    /// The stored pathway behind this display.
    pub fn original(&self) -> Pid {
        self.graph.derived_from().unwrap_or(self.graph.pid())
    }
}

/// Output of one composition pass.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    nodes: Vec<Node>,
    edges: NodeEdgeSet,
    entity_to_node: BTreeMap<String, Nid>,
    vrep_to_node: BTreeMap<Vid, Nid>,
    /// Every VRep a node stands for, primary or subsumed.
    subsumed: BTreeMap<Vid, Nid>,
    unresolved: Vec<UnresolvedEntity>,
    displayed: Vec<DisplayedPathway>,
}

impl Composition {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &NodeEdgeSet {
        &self.edges
    }

    pub fn node(&self, nid: &Nid) -> Option<&Node> {
        self.nodes.iter().find(|node| node.nid == *nid)
    }

    pub fn node_of_entity(&self, name: &str) -> Option<&Node> {
        self.entity_to_node
            .get(name)
            .and_then(|nid| self.node(nid))
    }

    /// The node a VRep ended up in, whether as primary or as a subsumed representation.
    pub fn node_of_vrep(&self, vid: &Vid) -> Option<&Node> {
        self.vrep_to_node
            .get(vid)
            .or_else(|| self.subsumed.get(vid))
            .and_then(|nid| self.node(nid))
    }

    /// The node of this composition standing for `node` of an earlier one: the node of its primary
    /// VRep, else of its first subsumed VRep found, else of its first entity found.
    pub fn resolve(&self, node: &Node) -> Option<&Node> {
        self.node_of_vrep(&node.vrep.vid)
            .or_else(|| {
                node.vreps_with_this_nodes_vertices
                    .iter()
                    .find_map(|vrep| self.node_of_vrep(&vrep.vid))
            })
            .or_else(|| {
                node.entities
                    .iter()
                    .find_map(|entity| self.node_of_entity(&entity.name))
            })
    }

    pub fn edges_of_node(&self, nid: &Nid) -> Vec<&NodeEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.source == *nid || edge.target == *nid)
            .collect()
    }

    /// Entities met while composing edges that had no node; the edges leading to them were skipped.
    pub fn unresolved(&self) -> &[UnresolvedEntity] {
        &self.unresolved
    }

    pub fn displayed(&self) -> &[DisplayedPathway] {
        &self.displayed
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self, nid: &Nid) -> Result<usize, PathwayError> {
        self.nodes
            .iter()
            .position(|node| node.nid == *nid)
            .ok_or_else(|| {
                PathwayError::InvariantViolation(format!(
                    "node {} is mapped but not part of the composition",
                    nid.short()
                ))
            })
    }

    fn push_node(&mut self, node: Node, pin: Option<Vid>) {
        if let Some(vid) = pin {
            self.vrep_to_node.insert(vid, node.nid);
        }
        self.subsumed.insert(node.vrep.vid, node.nid);
        for entity in node.entities.iter() {
            self.entity_to_node
                .entry(entity.name.clone())
                .or_insert(node.nid);
        }
        self.nodes.push(node);
    }

    /// Turn the VReps of `graph` into nodes, merging them into the nodes already present.
    ///
    /// With `add_to_same_graph` set, merged VReps are attached to `graph` even when the merged
    /// nodes come from another pathway; otherwise cross-pathway merges belong to `combined`.
    fn merge_pathway(
        &mut self,
        graph: &PathwayGraph,
        config: &ComposerConfig,
        combined: Pid,
        add_to_same_graph: bool,
    ) -> Result<(), PathwayError> {
        let pid = graph.pid();
        let target = MergeTarget {
            pathway_to_add: pid,
            combined,
        };

        for vrep in graph.vertices() {
            if config.display_only_vertices_with_edges() && graph.degree(&vrep.vid) == 0 {
                tracing::trace!("{vrep} has no edges in '{}', not shown", graph.title());
                continue;
            }
            if self.node_of_vrep(&vrep.vid).is_some() {
                continue;
            }
            let existing = self.existing_nodes(vrep);
            if vrep.is_group() || !config.remove_duplicate_vertices() || existing.is_empty() {
                let node = match Node::new(vrep, pid) {
                    Ok(node) => node,
                    Err(err) if err.is_recoverable() => {
                        tracing::debug!("skipping {vrep} of '{}': {err}", graph.title());
                        continue;
                    }
                    Err(err) => return Err(err),
                };
                // Groups always resolve through their VRep. With duplicates kept every VRep does,
                // since its entities may also belong to another node.
                let pin = if vrep.is_group() || !config.remove_duplicate_vertices() {
                    Some(vrep.vid)
                } else {
                    None
                };
                self.push_node(node, pin);
                continue;
            }
            self.merge_vrep(vrep, &existing, add_to_same_graph, &target)?;
        }
        Ok(())
    }

    /// Distinct nodes already holding one of the entities of `vrep`, in entity order.
    fn existing_nodes(&self, vrep: &VertexRep) -> Vec<Nid> {
        let mut existing = Vec::new();
        for entity in vrep.entities.iter() {
            if let Some(nid) = self.entity_to_node.get(&entity.name) {
                if !existing.contains(nid) {
                    existing.push(*nid);
                }
            }
        }
        existing
    }

    /// Merge `vrep` with every node in `existing`, replacing them by one node at the position of
    /// the first. Edges already composed are redirected onto the replacement.
    fn merge_vrep(
        &mut self,
        vrep: &VertexRep,
        existing: &[Nid],
        add_to_same_graph: bool,
        target: &MergeTarget,
    ) -> Result<(), PathwayError> {
        let only_this_pathway = BTreeSet::from([target.pathway_to_add]);
        let first_position = self.position(&existing[0])?;
        let first = &self.nodes[first_position];
        let mut merged = merge_nodes(
            &union_entities(&first.entities, &vrep.entities),
            vrep,
            first,
            first.pathways == only_this_pathway,
            add_to_same_graph,
            target,
        )?;

        for nid in existing[1..].iter() {
            let other = &self.nodes[self.position(nid)?];
            let within = merged.pathways == only_this_pathway && other.pathways == only_this_pathway;
            let mut folded = merge_nodes(
                &union_entities(&merged.entities, &other.entities),
                &other.vrep,
                &merged,
                within,
                add_to_same_graph,
                target,
            )?;
            folded
                .vreps_with_this_nodes_vertices
                .retain(|alternative| alternative.vid != merged.vrep.vid);
            for alternative in other.vreps_with_this_nodes_vertices.iter() {
                if !folded.vreps_with_this_nodes_vertices.contains(alternative) {
                    folded.vreps_with_this_nodes_vertices.push(alternative.clone());
                }
            }
            if !within {
                folded.pathways.extend(other.pathways.iter().copied());
            }
            merged = folded;
        }

        let new_nid = merged.nid;
        tracing::debug!("{vrep} merged into {merged}");
        // The merged node holds every entity and VRep of the nodes it replaces.
        for entity in merged.entities.iter() {
            self.entity_to_node.insert(entity.name.clone(), new_nid);
        }
        self.subsumed.insert(merged.vrep.vid, new_nid);
        for alternative in merged.vreps_with_this_nodes_vertices.iter() {
            self.subsumed.insert(alternative.vid, new_nid);
        }
        self.nodes[first_position] = merged;
        self.nodes
            .retain(|node| node.nid == new_nid || !existing.contains(&node.nid));
        for old in existing.iter() {
            redirect(old, &new_nid, &mut self.edges);
            for nid in self.vrep_to_node.values_mut() {
                if *nid == *old {
                    *nid = new_nid;
                }
            }
        }
        let dropped = self.edges.dedup_pairs();
        if dropped > 0 {
            tracing::debug!("{dropped} edges collapsed by merging {vrep}");
        }
        Ok(())
    }

    fn compose_pathway_edges(&mut self, graph: &PathwayGraph) -> Result<(), PathwayError> {
        for ends in graph.edges() {
            let composed = compose_edges_for_graph(
                &ends,
                graph,
                &self.entity_to_node,
                &self.vrep_to_node,
                &mut self.edges,
            )?;
            self.unresolved.extend(composed.unresolved);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Layout {
    focus_pathway: Option<Pid>,
    context_pathways: Vec<Pid>,
    focus: Option<Node>,
}

/// Composes stored pathways around a focus node.
///
/// Entry points are sequential: each one changes the layout or the configuration and runs a full
/// composition pass. Notifications go to the optional [ViewEvent] channel.
#[derive(Debug)]
pub struct PathwayComposer {
    store: PathwayStore,
    config: ComposerConfig,
    combined: Pid,
    layout: Layout,
    subpathways: BTreeMap<Pid, Pid>,
    composition: Composition,
    state: PassState,
    tx: Option<UnboundedSender<ViewEvent>>,
}

impl PathwayComposer {
    pub fn new(store: PathwayStore, config: ComposerConfig) -> PathwayComposer {
        PathwayComposer {
            store,
            config,
            combined: Pid::generate(),
            layout: Layout::default(),
            subpathways: BTreeMap::new(),
            composition: Composition::default(),
            state: PassState::Idle,
            tx: None,
        }
    }

    pub fn with_events(mut self, tx: UnboundedSender<ViewEvent>) -> PathwayComposer {
        self.tx = Some(tx);
        self
    }

    pub fn store(&self) -> &PathwayStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PathwayStore {
        &mut self.store
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Owner of the VReps synthesized by merges across pathways.
    pub fn combined_pathway(&self) -> Pid {
        self.combined
    }

    pub fn focus_pathway(&self) -> Option<Pid> {
        self.layout.focus_pathway
    }

    /// Stored pathways shown as context, in the order they were added.
    pub fn context_pathways(&self) -> &[Pid] {
        &self.layout.context_pathways
    }

    pub fn focus_node(&self) -> Option<&Node> {
        self.layout.focus.as_ref()
    }

    /// The full pathway a bounded subpathway was extracted from.
    pub fn original_of_subpathway(&self, pid: &Pid) -> Option<Pid> {
        self.subpathways.get(pid).copied()
    }

    pub fn is_subpathway(&self, pid: &Pid) -> bool {
        self.subpathways.contains_key(pid)
    }

    pub fn remove_subpathway_mapping(&mut self, pid: &Pid) -> Option<Pid> {
        self.subpathways.remove(pid)
    }

    /// True if `pid`, or the pathway it was extracted from, is on display.
    pub fn is_pathway_present(&self, pid: &Pid) -> bool {
        let original = self.resolve_original(pid);
        self.layout.focus_pathway == Some(original)
            || self.layout.context_pathways.contains(&original)
    }

    fn resolve_original(&self, pid: &Pid) -> Pid {
        self.original_of_subpathway(pid).unwrap_or(*pid)
    }

    fn send(&self, event: ViewEvent) -> Result<(), PathwayError> {
        if let Some(tx) = self.tx.as_ref() {
            tx.send(event)?;
        }
        Ok(())
    }

    /// Show a stored pathway. The first one becomes the focus pathway, later ones are context
    /// pathways, bounded around the focus node when one is set and the radius is positive.
    pub fn add_pathway(&mut self, pid: Pid) -> Result<(), PathwayError> {
        let graph = self.store.require(&pid)?;
        if self.is_pathway_present(&pid) {
            tracing::debug!("'{}' is already displayed", graph.title());
            return Ok(());
        }
        let mut layout = self.layout.clone();
        if layout.focus_pathway.is_none() {
            layout.focus_pathway = Some(pid);
        } else {
            layout.context_pathways.push(pid);
        }
        tracing::info!("adding '{}'", graph.title());
        self.compose(layout, self.config.clone())
    }

    /// Stop showing a pathway (stored or bounded ID). Removing the focus pathway clears the view.
    pub fn remove_pathway(&mut self, pid: Pid) -> Result<(), PathwayError> {
        let original = self.resolve_original(&pid);
        if self.layout.focus_pathway == Some(original) {
            let had_focus = self.layout.focus.is_some();
            self.layout = Layout::default();
            self.subpathways.clear();
            self.composition = Composition::default();
            self.state = PassState::Idle;
            self.send(ViewEvent::PathwayRemoved(original))?;
            if had_focus {
                self.send(ViewEvent::FocusChanged(None))?;
            }
            return Ok(());
        }
        if !self.layout.context_pathways.contains(&original) {
            return Err(PathwayError::NotFound(format!(
                "pathway {pid} is not displayed"
            )));
        }
        let bounded: Vec<Pid> = self
            .subpathways
            .iter()
            .filter(|(_, source)| **source == original)
            .map(|(sub, _)| *sub)
            .collect();
        for sub in bounded.iter() {
            self.remove_subpathway_mapping(sub);
        }
        let mut layout = self.layout.clone();
        layout.context_pathways.retain(|context| *context != original);
        self.compose(layout, self.config.clone())?;
        self.send(ViewEvent::PathwayRemoved(original))
    }

    /// Make a composed node the focus, or clear the focus with `None`. Context pathways are
    /// re-extracted around the new focus. Returns whether the focus changed.
    pub fn set_focus_node(&mut self, nid: Option<Nid>) -> Result<bool, PathwayError> {
        let focus = match nid {
            Some(nid) => Some(self.composition.node(&nid).cloned().ok_or_else(|| {
                PathwayError::NotFound(format!("node {nid} is not part of the composition"))
            })?),
            None => None,
        };
        let changed = match (self.layout.focus.as_ref(), focus.as_ref()) {
            (Some(current), Some(next)) => !same_focus(current, next),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return Ok(false);
        }
        let focus_vid = focus.as_ref().map(|node| node.vrep.vid);
        if self.layout.context_pathways.is_empty() {
            self.layout.focus = focus;
        } else {
            let mut layout = self.layout.clone();
            layout.focus = focus;
            self.compose(layout, self.config.clone())?;
        }
        self.send(ViewEvent::FocusChanged(focus_vid))?;
        Ok(true)
    }

    /// Focus the node holding the entity called `name`.
    pub fn focus_on_entity(&mut self, name: &str) -> Result<bool, PathwayError> {
        let nid = self
            .composition
            .node_of_entity(name)
            .map(|node| node.nid)
            .ok_or_else(|| PathwayError::NotFound(format!("no node holds entity '{name}'")))?;
        self.set_focus_node(Some(nid))
    }

    /// Change the environment radius (0 shows context pathways unbounded) and re-add the displayed
    /// pathways.
    pub fn set_environment_radius(&mut self, radius: u32) -> Result<(), PathwayError> {
        if radius == self.config.environment_radius {
            return Ok(());
        }
        let mut config = self.config.clone();
        config.environment_radius = radius;
        self.reconfigure(config)
    }

    /// Swap the focus pathway for a displayed context pathway. The old focus pathway becomes a
    /// context pathway.
    pub fn make_focus_pathway(&mut self, pid: Pid) -> Result<(), PathwayError> {
        let original = self.resolve_original(&pid);
        if self.layout.focus_pathway == Some(original) {
            return Ok(());
        }
        if !self.layout.context_pathways.contains(&original) {
            return Err(PathwayError::NotFound(format!(
                "pathway {pid} is not displayed"
            )));
        }
        if self.is_subpathway(&pid) {
            self.remove_subpathway_mapping(&pid);
        }
        let mut layout = self.layout.clone();
        layout.context_pathways.retain(|context| *context != original);
        if let Some(old_focus) = layout.focus_pathway.replace(original) {
            layout.context_pathways.push(old_focus);
        }
        self.compose(layout, self.config.clone())
    }

    /// Keep or collapse VReps sharing an entity. Refused while context pathways are displayed.
    pub fn set_remove_duplicate_vertices(&mut self, enabled: bool) -> Result<(), PathwayError> {
        if !self.layout.context_pathways.is_empty() {
            return Err(PathwayError::Command(
                "duplicate handling cannot change while context pathways are displayed".to_string(),
            ));
        }
        if self.config.remove_duplicate_vertices() == enabled {
            return Ok(());
        }
        let mut config = self.config.clone();
        config.set_option(
            CompositionOption::RemoveDuplicateVertices,
            enabled,
        );
        self.reconfigure(config)
    }

    pub fn set_display_only_vertices_with_edges(
        &mut self,
        enabled: bool,
    ) -> Result<(), PathwayError> {
        if self.config.display_only_vertices_with_edges() == enabled {
            return Ok(());
        }
        let mut config = self.config.clone();
        config.set_option(
            CompositionOption::DisplayOnlyVerticesWithEdges,
            enabled,
        );
        self.reconfigure(config)
    }

    fn reconfigure(&mut self, config: ComposerConfig) -> Result<(), PathwayError> {
        if self.layout.focus_pathway.is_none() {
            self.config = config;
            return Ok(());
        }
        self.compose(self.layout.clone(), config)
    }

    /// Rebuild the composition from the current layout, re-extracting every bounded pathway from
    /// its full original.
    pub fn recompose(&mut self) -> Result<(), PathwayError> {
        self.compose(self.layout.clone(), self.config.clone())
    }

    /// Stored pathways that are not displayed yet and contain a representation of the focus
    /// node's entities.
    pub fn pathways_sharing_focus(&self) -> Vec<Arc<PathwayGraph>> {
        let Some(focus) = self.layout.focus.as_ref() else {
            return Vec::new();
        };
        let displayed = self
            .layout
            .focus_pathway
            .iter()
            .chain(self.layout.context_pathways.iter())
            .copied();
        CommonEntityFilter::new(&self.store, &focus.entities, displayed).apply(&self.store)
    }

    #[tracing::instrument(skip_all)]
    fn compose(&mut self, layout: Layout, config: ComposerConfig) -> Result<(), PathwayError> {
        match self.run_pass(&layout, &config) {
            Ok((composition, subpathways)) => {
                let mut layout = layout;
                // Merged nodes get fresh keys every pass.
                if let Some(focus) = layout.focus.as_ref() {
                    if let Some(current) = composition.resolve(focus) {
                        layout.focus = Some(current.clone());
                    }
                }
                tracing::info!(
                    "composed {} pathways: {} nodes, {} edges, {} unresolved",
                    composition.displayed.len(),
                    composition.nodes.len(),
                    composition.edges.len(),
                    composition.unresolved.len()
                );
                self.layout = layout;
                self.config = config;
                self.composition = composition;
                self.subpathways = subpathways;
                self.state = PassState::Done;
                self.notify_composition()
            }
            Err(err) => {
                tracing::warn!("composition pass aborted: {err}");
                self.state = PassState::Idle;
                self.send(ViewEvent::PassAborted(err.to_string()))?;
                Err(err)
            }
        }
    }

    fn run_pass(
        &mut self,
        layout: &Layout,
        config: &ComposerConfig,
    ) -> Result<(Composition, BTreeMap<Pid, Pid>), PathwayError> {
        self.state = PassState::CollectingSourceGraphs;
        let mut sources = Vec::new();
        if let Some(pid) = layout.focus_pathway {
            sources.push((self.store.require(&pid)?, PathwayRole::Focus));
        }
        for pid in layout.context_pathways.iter() {
            sources.push((self.store.require(pid)?, PathwayRole::Context));
        }

        self.state = PassState::ExtractingEnvironments;
        let extractor =
            EnvironmentExtractor::new(&self.store).with_title_suffix(&config.derived_title_suffix);
        let mut subpathways = BTreeMap::new();
        let mut displayed = Vec::with_capacity(sources.len());
        for (source, role) in sources {
            let mut shown = DisplayedPathway {
                graph: source.clone(),
                role,
                could_not_focus: false,
            };
            if let (PathwayRole::Context, Some(focus), true) =
                (role, layout.focus.as_ref(), config.is_bounded())
            {
                match extractor.extract(&source, focus, config.environment_radius) {
                    Ok(derived) => {
                        subpathways.insert(derived.pid(), source.pid());
                        shown.graph = Arc::new(derived);
                    }
                    Err(err) if err.is_recoverable() => {
                        tracing::info!("'{}' could not be focused: {err}", source.title());
                        shown.could_not_focus = true;
                    }
                    Err(err) => return Err(err),
                }
            }
            displayed.push(shown);
        }

        // A lone focus pathway keeps its merged VReps to itself.
        let add_to_same_graph = displayed.len() == 1;
        let mut composition = Composition::default();
        for shown in displayed.iter() {
            self.state = PassState::MergingNodes;
            composition.merge_pathway(&shown.graph, config, self.combined, add_to_same_graph)?;
            self.state = PassState::ComposingEdges;
            composition.compose_pathway_edges(&shown.graph)?;
        }
        composition.displayed = displayed;
        Ok((composition, subpathways))
    }

    fn notify_composition(&self) -> Result<(), PathwayError> {
        if self.tx.is_none() {
            return Ok(());
        }
        for shown in self.composition.displayed.iter() {
            self.send(ViewEvent::PathwayAdded(
                shown.graph.pid(),
                shown.role,
                shown.graph.derived_from(),
            ))?;
            if shown.could_not_focus {
                self.send(ViewEvent::CouldNotFocus(shown.graph.pid()))?;
            }
        }
        self.send(ViewEvent::CompositionCompleted(
            self.composition.nodes.len(),
            self.composition.edges.len(),
            self.composition.unresolved.clone(),
        ))
    }
}

/// Two focus nodes are the same when one stands for the other's primary VRep.
fn same_focus(current: &Node, next: &Node) -> bool {
    current.nid == next.nid
        || next.represents(&current.vrep.vid)
        || current.represents(&next.vrep.vid)
}
