use {
    num::Zero,
    std::{
        cmp::Ordering,
        collections::{BinaryHeap, HashSet},
        hash::Hash,
        mem::take,
        ops::Add,
    },
};

pub struct OpenSetElement<V, C>(pub V, pub C);

impl<V: Clone + PartialEq, C: Clone + Ord> PartialEq for OpenSetElement<V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}

impl<V: Clone + PartialEq, C: Clone + Ord> PartialOrd for OpenSetElement<V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Reverse the order so that cost is minimized when popping from the heap
        Some(other.1.cmp(&self.1))
    }
}

impl<V: Clone + PartialEq, C: Clone + Ord> Eq for OpenSetElement<V, C> {}

impl<V: Clone + PartialEq, C: Clone + Ord> Ord for OpenSetElement<V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse the order so that cost is minimized when popping from the heap
        other.1.cmp(&self.1)
    }
}

struct NeighborUpdate {
    cost_is_lower: bool,
    is_in_open_set: bool,
}

pub struct DijkstraState<V, C> {
    open_set_heap: BinaryHeap<OpenSetElement<V, C>>,
    open_set_set: HashSet<V>,
    neighbors: Vec<OpenSetElement<V, C>>,
    neighbor_updates: Vec<NeighborUpdate>,
}

impl<V, C> DijkstraState<V, C> {
    fn clear(&mut self) {
        self.open_set_heap.clear();
        self.open_set_set.clear();
        self.neighbors.clear();
        self.neighbor_updates.clear();
    }
}

impl<V, C> Default for DijkstraState<V, C>
where
    OpenSetElement<V, C>: Ord,
{
    fn default() -> Self {
        Self {
            open_set_heap: Default::default(),
            open_set_set: Default::default(),
            neighbors: Default::default(),
            neighbor_updates: Default::default(),
        }
    }
}

/// An implementation of https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm
///
/// The user owns the vertex-to-best-cost mapping: `cost_from_start` reads it, and `update_vertex`
/// writes it. A vertex's recorded cost is only ever lowered, so a popped end vertex carries the
/// optimal cost. An exhausted open set without reaching an end vertex is a defined outcome,
/// reported as `None` from `run`.
pub trait Dijkstra {
    type Vertex: Clone + Eq + Hash;
    type Cost: Add<Self::Cost, Output = Self::Cost> + Clone + Ord + Sized + Zero;

    fn start(&self) -> &Self::Vertex;
    fn is_end(&self, vertex: &Self::Vertex) -> bool;
    fn path_to(&self, vertex: &Self::Vertex) -> Vec<Self::Vertex>;
    fn cost_from_start(&self, vertex: &Self::Vertex) -> Self::Cost;

    /// The cost is from `vertex` to the neighbor.
    fn neighbors(
        &self,
        vertex: &Self::Vertex,
        neighbors: &mut Vec<OpenSetElement<Self::Vertex, Self::Cost>>,
    );

    fn update_vertex(&mut self, from: &Self::Vertex, to: &Self::Vertex, cost: Self::Cost);
    fn reset(&mut self);

    fn run_internal(
        &mut self,
        state: &mut DijkstraState<Self::Vertex, Self::Cost>,
    ) -> Option<Vec<Self::Vertex>> {
        self.reset();
        state.clear();

        let start: Self::Vertex = self.start().clone();

        // The accumulated cost at the start vertex is zero by definition.
        state
            .open_set_heap
            .push(OpenSetElement(start.clone(), Self::Cost::zero()));
        state.open_set_set.insert(start);

        while let Some(OpenSetElement(current, _)) = state.open_set_heap.pop() {
            if self.is_end(&current) {
                return Some(self.path_to(&current));
            }

            let start_to_current: Self::Cost = self.cost_from_start(&current);

            state.open_set_set.remove(&current);
            self.neighbors(&current, &mut state.neighbors);

            if !state.neighbors.is_empty() {
                state.neighbor_updates.reserve(state.neighbors.len());

                let mut neighbor_updates_count: usize = 0_usize;
                let mut any_update_was_in_open_set_set: bool = false;

                for OpenSetElement(neighbor, neighbor_cost) in state.neighbors.iter_mut() {
                    let start_to_neighbor: Self::Cost =
                        start_to_current.clone() + neighbor_cost.clone();

                    if start_to_neighbor < self.cost_from_start(neighbor) {
                        self.update_vertex(&current, neighbor, start_to_neighbor.clone());

                        let is_in_open_set: bool = !state.open_set_set.insert(neighbor.clone());

                        *neighbor_cost = start_to_neighbor;
                        state.neighbor_updates.push(NeighborUpdate {
                            cost_is_lower: true,
                            is_in_open_set,
                        });
                        neighbor_updates_count += 1_usize;
                        any_update_was_in_open_set_set |= is_in_open_set;
                    } else {
                        state.neighbor_updates.push(NeighborUpdate {
                            cost_is_lower: false,
                            is_in_open_set: false,
                        });
                    }
                }

                if any_update_was_in_open_set_set {
                    // Convert to a vec first, add the new elements, then convert back, so that we
                    // don't waste time during `push` operations only to have that effort ignored
                    // when converting back to a heap
                    let mut open_set_elements: Vec<OpenSetElement<Self::Vertex, Self::Cost>> =
                        take(&mut state.open_set_heap).into_vec();

                    let old_element_count: usize = open_set_elements.len();

                    for (
                        open_set_element,
                        NeighborUpdate {
                            cost_is_lower,
                            is_in_open_set,
                        },
                    ) in state
                        .neighbors
                        .drain(..)
                        .zip(state.neighbor_updates.drain(..))
                    {
                        if cost_is_lower {
                            if is_in_open_set {
                                if let Some(OpenSetElement(_, cost_mut)) = open_set_elements
                                    [..old_element_count]
                                    .iter_mut()
                                    .find(|OpenSetElement(vertex, _)| *vertex == open_set_element.0)
                                {
                                    *cost_mut = open_set_element.1;
                                }
                            } else {
                                open_set_elements.push(open_set_element);
                            }
                        }
                    }

                    state.open_set_heap = open_set_elements.into();
                } else if neighbor_updates_count > 0_usize {
                    // None of the neighbors were previously in the open set, so just add all
                    // normally
                    state.open_set_heap.extend(
                        state
                            .neighbors
                            .drain(..)
                            .zip(state.neighbor_updates.drain(..))
                            .filter_map(|(open_set_element, neighbor_update)| {
                                if neighbor_update.cost_is_lower {
                                    Some(open_set_element)
                                } else {
                                    None
                                }
                            }),
                    );
                }

                state.neighbors.clear();
                state.neighbor_updates.clear();
            }
        }

        None
    }

    fn run(&mut self) -> Option<Vec<Self::Vertex>> {
        self.run_internal(&mut DijkstraState::default())
    }
}
