use {
    crate::*,
    glam::IVec2,
    nom::{
        character::complete::satisfy,
        combinator::{all_consuming, map},
        error::Error,
        AsChar, Err, IResult,
    },
    std::{
        collections::{HashMap, VecDeque},
        ops::RangeInclusive,
    },
    strum::IntoEnumIterator,
};

#[cfg_attr(test, derive(Debug, PartialEq))]
#[derive(Clone, Copy)]
struct HeatLoss(u8);

impl Parse for HeatLoss {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        map(satisfy(char::is_dec_digit), |c| Self(c as u8 - ZERO_OFFSET))(input)
    }
}

/// A search state: the block most recently entered, the direction of the move that entered it, and
/// how many consecutive blocks the path has covered in that direction.
///
/// `dir` is `None` only for the entry state at the start block, which has run length 0.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
struct Vertex {
    pos: IVec2,
    dir: Option<Direction>,
    run_len: u8,
}

struct VertexData {
    parent: Vertex,
    cost: u32,
}

struct MinimalHeatLossPathFinder<'s> {
    solution: &'s Solution,
    vertex_to_vertex_data: HashMap<Vertex, VertexData>,
    start: Vertex,
    end_pos: IVec2,
    run_len_range: RangeInclusive<u8>,
}

impl<'s> MinimalHeatLossPathFinder<'s> {
    fn min_run_len(&self) -> u8 {
        *self.run_len_range.start()
    }

    fn max_run_len(&self) -> u8 {
        *self.run_len_range.end()
    }

    /// A candidate move one block from `vertex` in `dir`, costing the heat loss of the block it
    /// enters, or `None` if that block is out of bounds.
    fn try_move(
        &self,
        vertex: &Vertex,
        dir: Direction,
        run_len: u8,
    ) -> Option<OpenSetElement<Vertex, u32>> {
        let pos: IVec2 = vertex.pos + dir.vec();

        self.solution.0.get(pos).map(|heat_loss| {
            OpenSetElement(
                Vertex {
                    pos,
                    dir: Some(dir),
                    run_len,
                },
                heat_loss.0 as u32,
            )
        })
    }
}

impl<'s> Dijkstra for MinimalHeatLossPathFinder<'s> {
    type Vertex = Vertex;
    type Cost = u32;

    fn start(&self) -> &Self::Vertex {
        &self.start
    }

    fn is_end(&self, vertex: &Self::Vertex) -> bool {
        // The entry state only qualifies when the start block is the end block, in which case no
        // block is ever entered and no heat is lost.
        vertex.pos == self.end_pos
            && vertex
                .dir
                .map_or(true, |_| vertex.run_len >= self.min_run_len())
    }

    fn path_to(&self, vertex: &Self::Vertex) -> Vec<Self::Vertex> {
        let mut path: VecDeque<Vertex> = VecDeque::new();
        let mut vertex: Vertex = *vertex;

        while vertex != self.start {
            path.push_front(vertex);
            vertex = self.vertex_to_vertex_data.get(&vertex).unwrap().parent;
        }

        path.push_front(vertex);

        path.into()
    }

    fn cost_from_start(&self, vertex: &Self::Vertex) -> Self::Cost {
        self.vertex_to_vertex_data
            .get(vertex)
            .map_or(u32::MAX, |vertex_data| vertex_data.cost)
    }

    fn neighbors(
        &self,
        vertex: &Self::Vertex,
        neighbors: &mut Vec<OpenSetElement<Self::Vertex, Self::Cost>>,
    ) {
        neighbors.clear();

        match vertex.dir {
            // No direction yet: the first move may head any direction that stays in bounds.
            None => neighbors
                .extend(Direction::iter().filter_map(|dir| self.try_move(vertex, dir, 1_u8))),
            Some(dir) => neighbors.extend(Turn::iter().filter_map(|turn| match turn {
                Turn::Straight => (vertex.run_len < self.max_run_len())
                    .then(|| self.try_move(vertex, dir, vertex.run_len + 1_u8))
                    .flatten(),
                _ => (vertex.run_len >= self.min_run_len())
                    .then(|| self.try_move(vertex, dir + turn, 1_u8))
                    .flatten(),
            })),
        }
    }

    fn update_vertex(&mut self, from: &Self::Vertex, to: &Self::Vertex, cost: Self::Cost) {
        self.vertex_to_vertex_data.insert(
            *to,
            VertexData {
                parent: *from,
                cost,
            },
        );
    }

    fn reset(&mut self) {
        self.vertex_to_vertex_data.clear();
        self.vertex_to_vertex_data.insert(
            self.start,
            VertexData {
                parent: self.start,
                cost: 0_u32,
            },
        );
    }
}

struct PathGridCell(u8);

impl From<Direction> for PathGridCell {
    fn from(value: Direction) -> Self {
        match value {
            Direction::North => Self(b'^'),
            Direction::East => Self(b'>'),
            Direction::South => Self(b'v'),
            Direction::West => Self(b'<'),
        }
    }
}

// SAFETY: `PathGridCell` can only be constructed from valid ASCII bytes.
unsafe impl IsValidAscii for PathGridCell {}

impl TryFrom<u8> for PathGridCell {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        if (0_u8..=9_u8).contains(&value) {
            Ok(Self(value + ZERO_OFFSET))
        } else {
            Err(())
        }
    }
}

#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Solution(Grid2D<HeatLoss>);

impl Solution {
    pub const CRUCIBLE_RUN_LEN_RANGE: RangeInclusive<u8> = 1_u8..=3_u8;
    pub const ULTRA_CRUCIBLE_RUN_LEN_RANGE: RangeInclusive<u8> = 4_u8..=10_u8;

    fn path_finder(&self, run_len_range: RangeInclusive<u8>) -> MinimalHeatLossPathFinder {
        MinimalHeatLossPathFinder {
            solution: self,
            vertex_to_vertex_data: HashMap::new(),
            start: Vertex {
                pos: IVec2::ZERO,
                dir: None,
                run_len: 0_u8,
            },
            end_pos: self.0.max_dimensions(),
            run_len_range,
        }
    }

    /// The minimal total heat loss reaching the bottom-right block from the top-left block, where
    /// the path may cover at most `run_len_range.end()` consecutive blocks in one direction, and
    /// must cover at least `run_len_range.start()` consecutive blocks in its current direction
    /// before turning 90 degrees (or arriving). Reversing is never an option, and the start
    /// block's own heat loss is never charged.
    ///
    /// `None` means no path satisfies the constraints. Expects `1 <= start <= end`.
    pub fn minimal_heat_loss_for_run_len_range(
        &self,
        run_len_range: RangeInclusive<u8>,
    ) -> Option<u32> {
        let mut path_finder: MinimalHeatLossPathFinder = self.path_finder(run_len_range);

        path_finder.run().map(|path| {
            path_finder
                .vertex_to_vertex_data
                .get(path.last().unwrap())
                .unwrap()
                .cost
        })
    }

    pub fn crucible_minimal_heat_loss(&self) -> Option<u32> {
        self.minimal_heat_loss_for_run_len_range(Self::CRUCIBLE_RUN_LEN_RANGE)
    }

    pub fn ultra_crucible_minimal_heat_loss(&self) -> Option<u32> {
        self.minimal_heat_loss_for_run_len_range(Self::ULTRA_CRUCIBLE_RUN_LEN_RANGE)
    }

    fn minimal_heat_loss_grid_and_cost(
        &self,
        run_len_range: RangeInclusive<u8>,
    ) -> Option<(Grid2D<PathGridCell>, u32)> {
        let mut path_finder: MinimalHeatLossPathFinder = self.path_finder(run_len_range);

        path_finder.run().map(|path| {
            let cost: u32 = path_finder
                .vertex_to_vertex_data
                .get(path.last().unwrap())
                .unwrap()
                .cost;
            let mut grid: Grid2D<PathGridCell> = Grid2D::try_from_cells_and_dimensions(
                self.0
                    .cells()
                    .iter()
                    .map(|heat_loss| PathGridCell::try_from(heat_loss.0).unwrap())
                    .collect(),
                self.0.dimensions(),
            )
            .unwrap();

            for vertex in path {
                if let Some(dir) = vertex.dir {
                    *grid.get_mut(vertex.pos).unwrap() = dir.into();
                }
            }

            (grid, cost)
        })
    }
}

impl Parse for Solution {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        map(Grid2D::<HeatLoss>::parse, Self)(input)
    }
}

impl RunQuestions for Solution {
    fn q1_internal(&mut self, args: &QuestionArgs) {
        if !args.verbose {
            dbg!(self.crucible_minimal_heat_loss());
        } else if let Some((grid, crucible_minimal_heat_loss)) =
            self.minimal_heat_loss_grid_and_cost(Self::CRUCIBLE_RUN_LEN_RANGE)
        {
            dbg!(crucible_minimal_heat_loss);

            println!("\n{}\n", String::from(grid));
        } else {
            eprintln!("failed to find crucible minimal heat loss path");
        }
    }

    fn q2_internal(&mut self, args: &QuestionArgs) {
        if !args.verbose {
            dbg!(self.ultra_crucible_minimal_heat_loss());
        } else if let Some((grid, ultra_crucible_minimal_heat_loss)) =
            self.minimal_heat_loss_grid_and_cost(Self::ULTRA_CRUCIBLE_RUN_LEN_RANGE)
        {
            dbg!(ultra_crucible_minimal_heat_loss);

            println!("\n{}\n", String::from(grid));
        } else {
            eprintln!("failed to find ultra crucible minimal heat loss path");
        }
    }
}

impl<'i> TryFrom<&'i str> for Solution {
    type Error = Err<Error<&'i str>>;

    fn try_from(input: &'i str) -> Result<Self, Self::Error> {
        Ok(all_consuming(Self::parse)(input)?.1)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::sync::OnceLock};

    const SOLUTION_STRS: &'static [&'static str] = &[
        "\
        2413432311323\n\
        3215453535623\n\
        3255245654254\n\
        3446585845452\n\
        4546657867536\n\
        1438598798454\n\
        4457876987766\n\
        3637877979653\n\
        4654967986887\n\
        4564679986453\n\
        1224686865563\n\
        2546548887735\n\
        4322674655533\n",
        "\
        111111111111\n\
        999999999991\n\
        999999999991\n\
        999999999991\n\
        999999999991\n",
    ];

    fn solution() -> &'static Solution {
        static ONCE_LOCK: OnceLock<Solution> = OnceLock::new();

        ONCE_LOCK.get_or_init(|| {
            Solution(
                Grid2D::try_from_cells_and_width(
                    [
                        2, 4, 1, 3, 4, 3, 2, 3, 1, 1, 3, 2, 3, 3, 2, 1, 5, 4, 5, 3, 5, 3, 5, 6, 2,
                        3, 3, 2, 5, 5, 2, 4, 5, 6, 5, 4, 2, 5, 4, 3, 4, 4, 6, 5, 8, 5, 8, 4, 5, 4,
                        5, 2, 4, 5, 4, 6, 6, 5, 7, 8, 6, 7, 5, 3, 6, 1, 4, 3, 8, 5, 9, 8, 7, 9, 8,
                        4, 5, 4, 4, 4, 5, 7, 8, 7, 6, 9, 8, 7, 7, 6, 6, 3, 6, 3, 7, 8, 7, 7, 9, 7,
                        9, 6, 5, 3, 4, 6, 5, 4, 9, 6, 7, 9, 8, 6, 8, 8, 7, 4, 5, 6, 4, 6, 7, 9, 9,
                        8, 6, 4, 5, 3, 1, 2, 2, 4, 6, 8, 6, 8, 6, 5, 5, 6, 3, 2, 5, 4, 6, 5, 4, 8,
                        8, 8, 7, 7, 3, 5, 4, 3, 2, 2, 6, 7, 4, 6, 5, 5, 5, 3, 3,
                    ]
                    .into_iter()
                    .map(|x| HeatLoss(x as u8))
                    .collect(),
                    13_usize,
                )
                .unwrap(),
            )
        })
    }

    #[test]
    fn test_try_from_str() {
        assert_eq!(
            Solution::try_from(SOLUTION_STRS[0_usize]).as_ref(),
            Ok(solution())
        );
    }

    #[test]
    fn test_try_from_str_rejects_malformed_input() {
        // Empty input
        assert!(Solution::try_from("").is_err());

        // Non-digit characters
        assert!(Solution::try_from("12\n3a\n").is_err());

        // Ragged rows, both shorter and longer than the first
        assert!(Solution::try_from("123\n45\n678\n").is_err());
        assert!(Solution::try_from("12\n345\n").is_err());

        // A ragged row whose length is a multiple of the first row's must not be re-wrapped into
        // multiple rows
        assert!(Solution::try_from("12\n3456\n").is_err());
        assert!(Solution::try_from("12\n3456").is_err());
    }

    #[test]
    fn test_crucible_minimal_heat_loss() {
        assert_eq!(solution().crucible_minimal_heat_loss(), Some(102_u32));
    }

    #[test]
    fn test_ultra_crucible_minimal_heat_loss() {
        assert_eq!(solution().ultra_crucible_minimal_heat_loss(), Some(94_u32));
        assert_eq!(
            Solution::try_from(SOLUTION_STRS[1_usize])
                .unwrap()
                .ultra_crucible_minimal_heat_loss(),
            Some(71_u32)
        );
    }

    #[test]
    fn test_increasing_max_run_len_never_increases_heat_loss() {
        for min_run_len in [1_u8, 4_u8] {
            let mut prev_heat_loss: u32 = u32::MAX;

            for max_run_len in min_run_len..=10_u8 {
                let heat_loss: u32 = solution()
                    .minimal_heat_loss_for_run_len_range(min_run_len..=max_run_len)
                    .unwrap();

                assert!(heat_loss <= prev_heat_loss);

                prev_heat_loss = heat_loss;
            }
        }
    }

    #[test]
    fn test_minimal_heat_loss_is_idempotent() {
        assert_eq!(
            solution().crucible_minimal_heat_loss(),
            solution().crucible_minimal_heat_loss()
        );
        assert_eq!(
            solution().ultra_crucible_minimal_heat_loss(),
            solution().ultra_crucible_minimal_heat_loss()
        );
    }

    #[test]
    fn test_single_block_grid() {
        let solution: Solution = Solution::try_from("5").unwrap();

        // The start block is the end block, and its heat loss is never charged.
        assert_eq!(solution.crucible_minimal_heat_loss(), Some(0_u32));
        assert_eq!(solution.ultra_crucible_minimal_heat_loss(), Some(0_u32));
    }

    #[test]
    fn test_unreachable_end() {
        // A 5-block corridor only allows a run length of 4 on arrival.
        let solution: Solution = Solution::try_from("11111").unwrap();

        assert_eq!(
            solution.minimal_heat_loss_for_run_len_range(5_u8..=10_u8),
            None
        );
        assert_eq!(
            solution.minimal_heat_loss_for_run_len_range(4_u8..=10_u8),
            Some(4_u32)
        );
    }
}
