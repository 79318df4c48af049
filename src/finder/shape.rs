//! Per-component statistics and the order in which components compete for
//! matrix slots.

use std::cmp::{Ordering, Reverse};

use crate::{
    finder::partition::{ComponentId, Partition},
    xor::Xor,
};

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentShape {
    pub id: ComponentId,
    /// Non-trivial XORs in the component
    pub rows: usize,
    /// Variables in the component
    pub cols: usize,
    /// Sum of XOR lengths over all rows
    pub sum_xor_sizes: usize,
    /// `sum_xor_sizes / (rows * cols)`, 0 for empty components
    pub density: f64,
}

impl ComponentShape {
    fn new(id: ComponentId, cols: usize) -> ComponentShape {
        ComponentShape {
            id,
            rows: 0,
            cols,
            sum_xor_sizes: 0,
            density: 0.0,
        }
    }

    pub fn tot_size(&self) -> usize {
        self.rows * self.cols
    }

    pub fn avg_xor_size(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.sum_xor_sizes as f64 / self.rows as f64
        }
    }

    /// Matrix slot priority: more rows first, then denser, then lower id
    pub fn priority_cmp(&self, other: &ComponentShape) -> Ordering {
        Reverse(self.rows)
            .cmp(&Reverse(other.rows))
            .then_with(|| other.density.total_cmp(&self.density))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A live component together with the XORs that fall into it
pub(crate) struct Component {
    pub(crate) shape: ComponentShape,
    pub(crate) xors: Vec<Xor>,
}

/// Distribute `xors` over the components of `partition`. Trivial XORs are
/// dropped. The result is sorted by priority, highest first.
///
/// Every non-trivial XOR must have been added to `partition`.
pub(crate) fn evaluate(partition: &Partition, xors: Vec<Xor>) -> Vec<Component> {
    let mut by_id: Vec<Option<Component>> = (0..partition.num_ids()).map(|_| None).collect();
    for (id, members) in partition.components() {
        by_id[id] = Some(Component {
            shape: ComponentShape::new(id, members.len()),
            xors: vec![],
        });
    }

    for xor in xors.into_iter().filter(|xor| !xor.is_trivial()) {
        // All variables of an XOR are in the same component, the first one will do
        let component = partition
            .component_of(xor[0])
            .and_then(|id| by_id[id].as_mut());
        let Some(component) = component else {
            panic!("XOR `{xor}` was not partitioned");
        };
        component.shape.rows += 1;
        component.shape.sum_xor_sizes += xor.len();
        component.xors.push(xor);
    }

    let mut components = by_id.into_iter().flatten().collect::<Vec<_>>();
    for component in components.iter_mut() {
        let shape = &mut component.shape;
        if shape.tot_size() > 0 {
            shape.density = shape.sum_xor_sizes as f64 / shape.tot_size() as f64;
        }
    }
    components.sort_by(|lhs, rhs| lhs.shape.priority_cmp(&rhs.shape));
    components
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::xor::Var;

    fn xor(vars: &[Var]) -> Xor {
        Xor::new(vars.iter().copied(), true)
    }

    #[test]
    fn test_shapes() {
        let xors = vec![
            xor(&[4, 5]),
            xor(&[1, 2]),
            xor(&[]),
            xor(&[2, 3]),
            xor(&[1, 2, 3]),
        ];
        let partition = Partition::from_xors(6, &xors);
        let components = evaluate(&partition, xors);

        let shapes = components
            .iter()
            .map(|component| component.shape.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            shapes,
            vec![
                ComponentShape {
                    id: 1,
                    rows: 3,
                    cols: 3,
                    sum_xor_sizes: 7,
                    density: 7.0 / 9.0,
                },
                ComponentShape {
                    id: 0,
                    rows: 1,
                    cols: 2,
                    sum_xor_sizes: 2,
                    density: 1.0,
                },
            ]
        );
        assert_eq!(components[0].xors.len(), 3);
        assert!((components[0].shape.avg_xor_size() - 7.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_priority_ties() {
        let shape = |id, rows, density| ComponentShape {
            id,
            rows,
            cols: 1,
            sum_xor_sizes: 0,
            density,
        };
        let mut shapes = vec![
            shape(0, 2, 0.5),
            shape(1, 2, 0.9),
            shape(2, 7, 0.1),
            shape(3, 2, 0.9),
        ];
        shapes.sort_by(ComponentShape::priority_cmp);
        assert_eq!(
            shapes.iter().map(|shape| shape.id).collect::<Vec<_>>(),
            vec![2, 1, 3, 0]
        );
    }
}
