use std::sync::Arc;

use super::*;
use crate::field::FieldData;

#[test]
fn structured_discretize_connectivity_matches_field_corners() {
    let structured = StructuredTopology::new(vec![1, 1, 1]);
    let (discrete, _mapper) = structured.discretize(1).unwrap();
    let discrete = as_discrete(discrete.as_ref()).unwrap();
    assert_eq!(discrete.celltype(), crate::zone::Shape::Hexahedron);
    assert_eq!(discrete.cells().num_rows(), 1);
    // a single cube cell references all 8 of the grid's nodes, in the same binary-counting
    // order FieldData::corners uses.
    let row = discrete.cells().row(0);
    let mut sorted = row.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn spline_pipeline_end_to_end() {
    let spline = SplineTopology::new(vec![2, 2], Arc::new(LinearEvaluator));
    assert_eq!(spline.num_nodes(), 9);
    let (discrete, mapper) = spline.discretize(1).unwrap();
    assert_eq!(discrete.num_nodes(), 9);
    assert_eq!(mapper.num_controlpoints(), 9);

    let cps = FieldData::from_flat((0..9).map(|i| i as f64).collect(), 1).unwrap();
    let sampled = mapper.apply(&cps).unwrap();
    assert_eq!(sampled, cps); // nvis=1 sampling is the identity on a uniform grid
}

#[test]
fn topology_trait_objects_are_downcastable_to_concrete_types() {
    let structured: Box<dyn Topology> = Box::new(StructuredTopology::new(vec![1]));
    assert!(structured.downcast_ref::<StructuredTopology>().is_some());
    assert!(structured.downcast_ref::<UnstructuredTopology>().is_none());
}
