//! Element arena and wiring.

use rand::RngCore;

use super::types::{Direction, ElementId, Orientation, PerDirection, TunnelCandidate};
use crate::element::{
    check_connections, select_candidate, Element, ElementParams, Junction, JunctionStack,
    MemberKind, OnewayParams, OnewayUnit, Oscillator,
};
use crate::error::{Result, SeoError};

/// The leaf elements an operation on some element fans out to.
///
/// A junction or stack maps to itself, a one-way unit to its four members.
#[derive(Debug, Clone, Copy)]
pub struct LeafIds {
    ids: [ElementId; 4],
    len: usize,
}

impl LeafIds {
    fn one(id: ElementId) -> Self {
        Self {
            ids: [id; 4],
            len: 1,
        }
    }

    fn four(ids: [ElementId; 4]) -> Self {
        Self { ids, len: 4 }
    }

    pub fn as_slice(&self) -> &[ElementId] {
        &self.ids[..self.len]
    }
}

impl IntoIterator for LeafIds {
    type Item = ElementId;
    type IntoIter = std::iter::Take<std::array::IntoIter<ElementId, 4>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter().take(self.len)
    }
}

/// Arena owning every element of a scenario.
///
/// Elements are addressed by [`ElementId`] and may be referenced from any
/// number of grids and neighbour lists.
#[derive(Debug, Default, Clone)]
pub struct Circuit {
    elements: Vec<Element>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements, including one-way members.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.0 < self.elements.len()
    }

    /// Get an element by handle.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// Iterate over `(handle, element)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i), e))
    }

    fn element(&self, id: ElementId) -> Result<&Element> {
        self.elements
            .get(id.0)
            .ok_or(SeoError::UnknownElement { element: id })
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id.0)
            .ok_or(SeoError::UnknownElement { element: id })
    }

    fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        id
    }

    // ============ Construction ============

    /// Add a single junction oscillator.
    pub fn add_junction(&mut self, params: ElementParams) -> Result<ElementId> {
        params.validate()?;
        Ok(self.push(Element::Junction(Junction::new(params))))
    }

    /// Add a series stack of `multi_num` junctions.
    pub fn add_stack(&mut self, params: ElementParams, multi_num: u32) -> Result<ElementId> {
        params.validate()?;
        let stack = JunctionStack::new(params, multi_num)?;
        Ok(self.push(Element::Stack(stack)))
    }

    fn add_member(&mut self, params: ElementParams, kind: MemberKind) -> Result<ElementId> {
        match kind {
            MemberKind::Junction => self.add_junction(params),
            MemberKind::Stack(n) => self.add_stack(params, n),
        }
    }

    /// Add a one-way unit, allocating and parametrising its four members.
    pub fn add_oneway(
        &mut self,
        orientation: Orientation,
        params: OnewayParams,
        kind: MemberKind,
    ) -> Result<ElementId> {
        let member_params = params.member_params(orientation);
        let mut members = [ElementId(0); 4];
        for (slot, p) in members.iter_mut().zip(member_params) {
            *slot = self.add_member(p, kind)?;
        }
        Ok(self.push(Element::Oneway(OnewayUnit::new(members, orientation))))
    }

    /// The four members of a one-way unit.
    pub fn members(&self, unit: ElementId) -> Result<[ElementId; 4]> {
        self.element(unit)?
            .as_oneway()
            .map(OnewayUnit::members)
            .ok_or(SeoError::NotComposite { element: unit })
    }

    // ============ Wiring ============

    /// Replace the neighbour list of an element.
    ///
    /// For a one-way unit the list is applied to each member. Every member
    /// is checked before any wiring is replaced.
    pub fn connect(&mut self, id: ElementId, connections: &[ElementId]) -> Result<()> {
        for &other in connections {
            self.element(other)?;
        }
        if connections.contains(&id) {
            return Err(SeoError::SelfConnection { element: id });
        }
        let leaves = self.leaf_ids(id)?;
        for leaf in leaves {
            let legs = self.oscillator(leaf)?.params().legs;
            check_connections(leaf, legs, connections)?;
        }
        for leaf in leaves {
            self.oscillator_mut(leaf)?.node_mut().connections = connections.to_vec();
        }
        Ok(())
    }

    /// Wire a one-way unit between two external elements.
    pub fn connect_oneway(&mut self, unit: ElementId, left: ElementId, right: ElementId) -> Result<()> {
        self.element(left)?;
        self.element(right)?;
        let oneway = self
            .element(unit)?
            .as_oneway()
            .ok_or(SeoError::NotComposite { element: unit })?;
        oneway.check_endpoints(unit, left, right)?;
        let wiring = oneway.member_connections(left, right);
        for (member, connections) in oneway.members().into_iter().zip(wiring) {
            self.connect(member, &connections)?;
        }
        Ok(())
    }

    /// Leaf elements an operation on `id` applies to.
    pub fn leaf_ids(&self, id: ElementId) -> Result<LeafIds> {
        Ok(match self.element(id)? {
            Element::Oneway(unit) => LeafIds::four(unit.members()),
            _ => LeafIds::one(id),
        })
    }

    /// Oscillator physics of a leaf element.
    pub fn oscillator(&self, id: ElementId) -> Result<&dyn Oscillator> {
        self.element(id)?
            .oscillator()
            .ok_or(SeoError::NotLeaf { element: id })
    }

    pub fn oscillator_mut(&mut self, id: ElementId) -> Result<&mut dyn Oscillator> {
        self.element_mut(id)?
            .oscillator_mut()
            .ok_or(SeoError::NotLeaf { element: id })
    }

    // ============ Element contract ============

    /// Sum of the neighbours' current `Vn` for a leaf element.
    pub fn neighbor_sum(&self, leaf: ElementId) -> Result<f64> {
        let node = self.oscillator(leaf)?.node();
        node.connections
            .iter()
            .map(|&n| self.vn(n))
            .sum()
    }

    /// Recompute `V_sum` from the neighbours' voltages.
    ///
    /// All sums are read before any is written, so members of a one-way
    /// unit see each other's previous values.
    pub fn set_surrounding_voltages(&mut self, id: ElementId) -> Result<()> {
        let leaves = self.leaf_ids(id)?;
        let mut sums = [0.0; 4];
        for (sum, leaf) in sums.iter_mut().zip(leaves) {
            *sum = self.neighbor_sum(leaf)?;
        }
        for (sum, leaf) in sums.into_iter().zip(leaves) {
            self.oscillator_mut(leaf)?.node_mut().v_sum = sum;
        }
        Ok(())
    }

    /// Overwrite `V_sum` (fan-out to all members of a one-way unit).
    pub fn set_v_sum(&mut self, id: ElementId, v_sum: f64) -> Result<()> {
        for leaf in self.leaf_ids(id)? {
            self.oscillator_mut(leaf)?.node_mut().v_sum = v_sum;
        }
        Ok(())
    }

    /// Raise `V_sum` by an external trigger voltage.
    ///
    /// A one-way unit reads member 0's sum and writes the raised value to
    /// all four members.
    pub fn inject_voltage(&mut self, id: ElementId, magnitude: f64) -> Result<()> {
        let v_sum = self.v_sum(id)? + magnitude;
        self.set_v_sum(id, v_sum)
    }

    /// Recompute `Vn`.
    pub fn update_voltage(&mut self, id: ElementId) -> Result<()> {
        for leaf in self.leaf_ids(id)? {
            self.oscillator_mut(leaf)?.update_voltage();
        }
        Ok(())
    }

    /// Recompute `dE`.
    pub fn update_energy(&mut self, id: ElementId) -> Result<()> {
        for leaf in self.leaf_ids(id)? {
            self.oscillator_mut(leaf)?.update_energy();
        }
        Ok(())
    }

    /// Sample wait times.
    ///
    /// For a one-way unit every member is sampled and the member with the
    /// smallest positive wait time is remembered as the unit's next event.
    pub fn sample_wait_times(&mut self, id: ElementId, rng: &mut dyn RngCore) -> Result<bool> {
        match self.element(id)? {
            Element::Oneway(unit) => {
                let members = unit.members();
                let mut enabled = false;
                for member in members {
                    enabled |= self.oscillator_mut(member)?.sample_wait_times(rng);
                }
                let mut waits = Vec::with_capacity(4);
                for member in members {
                    waits.push((member, self.oscillator(member)?.node().wt));
                }
                let locate = select_candidate(waits);
                if let Some(unit) = self.element_mut(id)?.as_oneway_mut() {
                    unit.set_locate(locate);
                }
                Ok(enabled)
            }
            _ => Ok(self.oscillator_mut(id)?.sample_wait_times(rng)),
        }
    }

    /// The event an element would fire next, from the last sampling.
    ///
    /// One-way units resolve to their chosen member. Leaves report their
    /// smallest positive wait time.
    pub fn next_event(&self, id: ElementId) -> Result<Option<TunnelCandidate>> {
        match self.element(id)? {
            Element::Oneway(unit) => Ok(unit.locate()),
            _ => Ok(select_candidate([(id, self.wt(id)?)])),
        }
    }

    /// Apply a tunnel event.
    ///
    /// A one-way unit forwards to the member and direction picked by the
    /// last sampling, ignoring `direction`; nothing happens if no member
    /// was enabled.
    pub fn tunnel(&mut self, id: ElementId, direction: Direction) -> Result<()> {
        let (target, direction) = match self.element(id)? {
            Element::Oneway(unit) => match unit.locate() {
                Some(candidate) => (candidate.element, candidate.direction),
                None => return Ok(()),
            },
            _ => (id, direction),
        };
        self.oscillator_mut(target)?.tunnel(direction);
        Ok(())
    }

    /// Integrate the leakage current over `dt`.
    pub fn update_charge(&mut self, id: ElementId, dt: f64) -> Result<()> {
        for leaf in self.leaf_ids(id)? {
            self.oscillator_mut(leaf)?.update_charge(dt);
        }
        Ok(())
    }

    // ============ Accessors ============

    /// Representative leaf: itself, or member 0 of a one-way unit.
    fn representative(&self, id: ElementId) -> Result<ElementId> {
        Ok(self.leaf_ids(id)?.as_slice()[0])
    }

    pub fn vn(&self, id: ElementId) -> Result<f64> {
        Ok(self.oscillator(self.representative(id)?)?.node().vn)
    }

    pub fn vd(&self, id: ElementId) -> Result<f64> {
        Ok(self.oscillator(self.representative(id)?)?.node().vd)
    }

    pub fn q(&self, id: ElementId) -> Result<f64> {
        Ok(self.oscillator(self.representative(id)?)?.node().q)
    }

    pub fn v_sum(&self, id: ElementId) -> Result<f64> {
        Ok(self.oscillator(self.representative(id)?)?.node().v_sum)
    }

    pub fn d_e(&self, id: ElementId) -> Result<PerDirection<f64>> {
        Ok(self.oscillator(self.representative(id)?)?.node().d_e)
    }

    /// Wait times; a one-way unit reports its chosen member (zeros if none).
    pub fn wt(&self, id: ElementId) -> Result<PerDirection<f64>> {
        match self.element(id)? {
            Element::Oneway(unit) => match unit.locate() {
                Some(candidate) => Ok(self.oscillator(candidate.element)?.node().wt),
                None => Ok(PerDirection::splat(0.0)),
            },
            _ => Ok(self.oscillator(id)?.node().wt),
        }
    }

    pub fn connections(&self, leaf: ElementId) -> Result<&[ElementId]> {
        Ok(&self.oscillator(leaf)?.node().connections)
    }

    /// Set the bias voltage. Ignored for one-way units, whose
    /// member biases are fixed by [`OnewayParams`].
    pub fn set_bias(&mut self, id: ElementId, vd: f64) -> Result<()> {
        match self.element_mut(id)? {
            Element::Oneway(_) => {
                log::debug!("ignoring bias write to one-way unit {id}");
            }
            element => {
                if let Some(osc) = element.oscillator_mut() {
                    osc.node_mut().vd = vd;
                }
            }
        }
        Ok(())
    }

    /// First leaf with a non-finite charge or voltage.
    pub fn check_finite(&self) -> Result<()> {
        for (id, element) in self.iter() {
            if let Some(osc) = element.oscillator() {
                let node = osc.node();
                for value in [node.q, node.vn] {
                    if !value.is_finite() {
                        return Err(SeoError::NumericalOverflow { element: id, value });
                    }
                }
            }
        }
        Ok(())
    }
}
