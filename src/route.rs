use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::action::Action;
use crate::grid::{Grid, Position};
use crate::types::{Heading, TurnDirection};

#[derive(Clone, Eq, PartialEq)]
struct Node {
    position: Position,
    f_cost: usize,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_cost.cmp(&self.f_cost)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const NEIGHBOURS: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

/// A* over the 4-neighbourhood. Returns the cells after `start` up to and
/// including `goal`, or `None` when the goal cannot be reached.
pub fn shortest_path(grid: &Grid, start: Position, goal: Position) -> Option<VecDeque<Position>> {
    if !grid.is_passable(start) || !grid.is_passable(goal) {
        return None;
    }
    if start == goal {
        return Some(VecDeque::new());
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, usize> = HashMap::new();

    g_score.insert(start, 0);
    open_set.push(Node {
        position: start,
        f_cost: manhattan(start, goal),
    });

    while let Some(current) = open_set.pop() {
        let current_pos = current.position;

        if current_pos == goal {
            let mut path = VecDeque::new();
            let mut cursor = goal;
            while cursor != start {
                path.push_front(cursor);
                cursor = *came_from.get(&cursor)?;
            }
            return Some(path);
        }

        let current_g = g_score.get(&current_pos).copied().unwrap_or(usize::MAX);
        for heading in NEIGHBOURS {
            let Some(neighbor) = grid.step(current_pos, heading) else {
                continue;
            };
            if !grid.is_passable(neighbor) {
                continue;
            }

            let tentative = current_g + 1;
            if g_score.get(&neighbor).is_none_or(|&g| tentative < g) {
                came_from.insert(neighbor, current_pos);
                g_score.insert(neighbor, tentative);
                open_set.push(Node {
                    position: neighbor,
                    f_cost: tentative + manhattan(neighbor, goal),
                });
            }
        }
    }

    None
}

/// Compiles a shortest route to the target into rover actions, ending with
/// the analyze, drill and transmit sequence.
pub fn plan_route(grid: &Grid, start: Position, heading: Heading) -> Option<Vec<Action>> {
    let path = shortest_path(grid, start, grid.target())?;

    let mut actions = Vec::new();
    let mut facing = heading;
    let mut at = start;
    for next in path {
        let wanted = direction_between(at, next)?;
        actions.extend(turns_between(facing, wanted).into_iter().map(Action::Turn));
        actions.push(Action::Move);
        facing = wanted;
        at = next;
    }

    actions.extend([Action::AnalyzeTerrain, Action::Drill, Action::Transmit]);
    Some(actions)
}

fn direction_between(from: Position, to: Position) -> Option<Heading> {
    NEIGHBOURS.into_iter().find(|heading| {
        let (dx, dy) = heading.delta();
        from.x.checked_add_signed(dx) == Some(to.x) && from.y.checked_add_signed(dy) == Some(to.y)
    })
}

/// Fewest quarter turns taking `from` to `to`.
fn turns_between(from: Heading, to: Heading) -> Vec<TurnDirection> {
    if from == to {
        Vec::new()
    } else if from.turned(TurnDirection::Right) == to {
        vec![TurnDirection::Right]
    } else if from.turned(TurnDirection::Left) == to {
        vec![TurnDirection::Left]
    } else {
        vec![TurnDirection::Right, TurnDirection::Right]
    }
}

fn manhattan(a: Position, b: Position) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_path_has_manhattan_length() {
        let grid = Grid::reference();
        let path = shortest_path(&grid, Position::new(0, 0), grid.target()).unwrap();
        assert_eq!(path.len(), 8);
        assert_eq!(path.back(), Some(&Position::new(4, 4)));
        assert!(!path.contains(&Position::new(1, 1)));
    }

    #[test]
    fn walled_target_is_unreachable() {
        let walls = [Position::new(2, 1), Position::new(1, 2)];
        let grid = Grid::new(3, 3, &walls, Position::new(2, 2)).unwrap();
        assert!(shortest_path(&grid, Position::new(0, 0), grid.target()).is_none());
        assert!(plan_route(&grid, Position::new(0, 0), Heading::East).is_none());
    }

    #[test]
    fn plan_turns_only_when_needed() {
        let grid = Grid::new(3, 1, &[], Position::new(2, 0)).unwrap();
        let plan = plan_route(&grid, Position::new(0, 0), Heading::East).unwrap();
        assert_eq!(
            plan,
            vec![Action::Move, Action::Move, Action::AnalyzeTerrain, Action::Drill, Action::Transmit]
        );

        let plan = plan_route(&grid, Position::new(0, 0), Heading::West).unwrap();
        assert_eq!(&plan[..3], &[
            Action::Turn(TurnDirection::Right),
            Action::Turn(TurnDirection::Right),
            Action::Move
        ]);
    }

    #[test]
    fn plan_on_target_only_collects() {
        let grid = Grid::new(1, 1, &[], Position::new(0, 0)).unwrap();
        let plan = plan_route(&grid, Position::new(0, 0), Heading::North).unwrap();
        assert_eq!(plan, vec![Action::AnalyzeTerrain, Action::Drill, Action::Transmit]);
    }
}
