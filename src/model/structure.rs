//! Structure - the validated, immutable structural snapshot

use nalgebra_sparse::{CooMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use crate::math::{Mat, Vec as DVec};
use crate::model::{Element, Node};

/// A structural snapshot: nodes plus elements referencing them by index.
///
/// A `Structure` is validated on construction and never mutated afterwards;
/// every solver step produces a successor snapshot through the `with_*`
/// builders, so staged analyses (prestress stage, then load stage) chain
/// snapshots, each treating its predecessor's geometry as its initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    nodes: Vec<Node>,
    elements: Vec<Element>,
}

impl Structure {
    /// Assemble and validate a structure.
    ///
    /// Fails fast on out-of-range or degenerate connectivity, non-finite or
    /// negative section properties, and on a structure with no restrained
    /// axis at all. Elements with a zero free length take their as-built
    /// chord length as the unstressed length.
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>) -> SolverResult<Self> {
        let count = nodes.len();

        let mut elements = elements;
        for (index, element) in elements.iter_mut().enumerate() {
            for end in [element.end_a, element.end_b] {
                if end >= count {
                    return Err(SolverError::NodeIndexOutOfRange {
                        element: index,
                        index: end,
                        count,
                    });
                }
            }
            if element.end_a == element.end_b {
                return Err(SolverError::DegenerateElement(index));
            }

            for (what, value) in [
                ("compression area", element.area.compression),
                ("tension area", element.area.tension),
                ("compression modulus", element.modulus.compression),
                ("tension modulus", element.modulus.tension),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(SolverError::InvalidProperty {
                        element: index,
                        what,
                        requirement: "finite and non-negative",
                        value,
                    });
                }
            }
            if !element.tension.is_finite() {
                return Err(SolverError::InvalidProperty {
                    element: index,
                    what: "tension",
                    requirement: "finite",
                    value: element.tension,
                });
            }
            if !element.free_length.is_finite() || element.free_length < 0.0 {
                return Err(SolverError::InvalidProperty {
                    element: index,
                    what: "free length",
                    requirement: "finite and non-negative",
                    value: element.free_length,
                });
            }
            if element.free_length == 0.0 {
                let chord = nodes[element.end_a].distance_to(&nodes[element.end_b]);
                if chord <= 0.0 {
                    return Err(SolverError::ZeroLength(index));
                }
                element.free_length = chord;
            }
        }

        let restrained = nodes.iter().any(|n| n.free.iter().any(|f| !*f));
        if !restrained {
            return Err(SolverError::NoRestraint);
        }

        Ok(Self { nodes, elements })
    }

    /// Nodes in index order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Elements in index order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Total DOF count, three per node
    pub fn dof_count(&self) -> usize {
        3 * self.nodes.len()
    }

    /// Indices of free DOFs into the 3n DOF vector (DOF = 3·node + axis)
    pub fn free_dofs(&self) -> Vec<usize> {
        self.dof_indices(true)
    }

    /// Indices of fixed DOFs into the 3n DOF vector
    pub fn fixed_dofs(&self) -> Vec<usize> {
        self.dof_indices(false)
    }

    fn dof_indices(&self, free: bool) -> Vec<usize> {
        let mut dofs = Vec::new();
        for (n, node) in self.nodes.iter().enumerate() {
            for axis in 0..3 {
                if node.free[axis] == free {
                    dofs.push(3 * n + axis);
                }
            }
        }
        dofs
    }

    /// Current node coordinates as an n×3 matrix
    pub fn coordinate_matrix(&self) -> Mat {
        Mat::from_fn(self.nodes.len(), 3, |i, axis| self.nodes[i].coords()[axis])
    }

    /// Current element tensions as a vector (N)
    pub fn tensions(&self) -> DVec {
        DVec::from_iterator(self.elements.len(), self.elements.iter().map(|e| e.tension))
    }

    /// Element-node connectivity matrix C: one row per element with -1 at
    /// `end_a` and +1 at `end_b`, so C·coordinates yields the element
    /// difference vectors.
    pub fn connectivity(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.elements.len(), self.nodes.len());
        for (e, element) in self.elements.iter().enumerate() {
            coo.push(e, element.end_a, -1.0);
            coo.push(e, element.end_b, 1.0);
        }
        CsrMatrix::from(&coo)
    }

    /// Successor snapshot with the 3n displacement vector added to the
    /// coordinates
    pub fn with_displacements(&self, displacements: &DVec) -> SolverResult<Structure> {
        self.expect_len(displacements.len(), self.dof_count(), "displacement vector")?;
        let mut nodes = self.nodes.clone();
        for (n, node) in nodes.iter_mut().enumerate() {
            node.x += displacements[3 * n];
            node.y += displacements[3 * n + 1];
            node.z += displacements[3 * n + 2];
        }
        Ok(Self {
            nodes,
            elements: self.elements.clone(),
        })
    }

    /// Successor snapshot with coordinates replaced by an n×3 matrix
    pub fn with_coordinate_matrix(&self, coordinates: &Mat) -> SolverResult<Structure> {
        if coordinates.nrows() != self.nodes.len() || coordinates.ncols() != 3 {
            return Err(SolverError::DimensionMismatch {
                what: "coordinate matrix rows",
                expected: self.nodes.len(),
                actual: coordinates.nrows(),
            });
        }
        let mut nodes = self.nodes.clone();
        for (n, node) in nodes.iter_mut().enumerate() {
            node.x = coordinates[(n, 0)];
            node.y = coordinates[(n, 1)];
            node.z = coordinates[(n, 2)];
        }
        Ok(Self {
            nodes,
            elements: self.elements.clone(),
        })
    }

    /// Successor snapshot with element tensions replaced
    pub fn with_tensions(&self, tensions: &DVec) -> SolverResult<Structure> {
        self.expect_len(tensions.len(), self.elements.len(), "tension vector")?;
        let mut elements = self.elements.clone();
        for (e, element) in elements.iter_mut().enumerate() {
            element.tension = tensions[e];
        }
        Ok(Self {
            nodes: self.nodes.clone(),
            elements,
        })
    }

    /// Successor snapshot with free-length variations added (actuation or
    /// prestress). The varied lengths must stay positive.
    pub fn with_free_length_changes(&self, changes: &DVec) -> SolverResult<Structure> {
        self.expect_len(changes.len(), self.elements.len(), "free length variation")?;
        let mut elements = self.elements.clone();
        for (e, element) in elements.iter_mut().enumerate() {
            let varied = element.free_length + changes[e];
            if !varied.is_finite() || varied <= 0.0 {
                return Err(SolverError::InvalidProperty {
                    element: e,
                    what: "varied free length",
                    requirement: "positive",
                    value: varied,
                });
            }
            element.free_length = varied;
        }
        Ok(Self {
            nodes: self.nodes.clone(),
            elements,
        })
    }

    fn expect_len(&self, actual: usize, expected: usize, what: &'static str) -> SolverResult<()> {
        if actual == expected {
            Ok(())
        } else {
            Err(SolverError::DimensionMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    fn two_bar() -> Structure {
        let nodes = vec![
            Node::fixed(0.0, 0.0, 0.0),
            Node::new(1.0, 0.0, 1.0).with_restraints(false, true, false),
            Node::fixed(2.0, 0.0, 0.0),
        ];
        let elements = vec![
            Element::bar(0, 1, 2500.0, 10_000.0),
            Element::bar(1, 2, 2500.0, 10_000.0),
        ];
        Structure::new(nodes, elements).unwrap()
    }

    #[test]
    fn resolves_natural_free_lengths() {
        let structure = two_bar();
        let expected = 2.0_f64.sqrt();
        for element in structure.elements() {
            assert!((element.free_length - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_out_of_range_index() {
        let nodes = vec![Node::fixed(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
        let err = Structure::new(nodes, vec![Element::bar(0, 7, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, SolverError::NodeIndexOutOfRange { .. }));
    }

    #[test]
    fn rejects_self_loop() {
        let nodes = vec![Node::fixed(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
        let err = Structure::new(nodes, vec![Element::bar(1, 1, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, SolverError::DegenerateElement(0)));
    }

    #[test]
    fn rejects_fully_free_structure() {
        let nodes = vec![Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
        let err = Structure::new(nodes, vec![Element::bar(0, 1, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, SolverError::NoRestraint));
    }

    #[test]
    fn dof_partition_is_complete() {
        let structure = two_bar();
        let free = structure.free_dofs();
        let fixed = structure.fixed_dofs();
        assert_eq!(free, vec![3, 5]);
        assert_eq!(free.len() + fixed.len(), structure.dof_count());
    }

    #[test]
    fn snapshot_builders_do_not_mutate_the_original() {
        let structure = two_bar();
        let displaced = structure
            .with_displacements(&DVec::from_vec(vec![0.0; 9]))
            .unwrap();
        let retensioned = structure
            .with_tensions(&DVec::from_vec(vec![5.0, -5.0]))
            .unwrap();

        assert_eq!(structure, displaced);
        assert_eq!(structure.tensions(), DVec::from_vec(vec![0.0, 0.0]));
        assert_eq!(retensioned.tensions(), DVec::from_vec(vec![5.0, -5.0]));
    }

    #[test]
    fn length_variation_must_stay_positive() {
        let structure = two_bar();
        let err = structure
            .with_free_length_changes(&DVec::from_vec(vec![-5.0, 0.0]))
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidProperty { .. }));
    }
}
