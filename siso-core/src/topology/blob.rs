use std::sync::Arc;

use crate::error::{SisoError, SisoResult};
use crate::field::FieldData;

use super::evaluator::LinearEvaluator;
use super::spline::{LrTopology, SplineTopology};
use super::structured::StructuredTopology;
use super::Topology;

const LAGRANGIAN_HEADER: &str = "# LAGRANGIAN";
const LRSPLINE_HEADER: &str = "# LRSPLINE";

/// Parse a single patch blob into `(corners, topology, control_points)`.
///
/// Dispatches on the first line: `"# LAGRANGIAN"` yields an already-discrete topology (via
/// [`StructuredTopology::discretize`]), `"# LRSPLINE"` yields an [`LrTopology`], and anything
/// else is treated as a (uniform-knot) B-spline patch and yields a [`SplineTopology`]. The
/// concrete binary container formats these headers are read from (HDF5 datasets, `.g2`
/// files, LR text files) are external readers' job; this function owns only the minimal
/// `cells`/`ncomps`/control-point-rows text grammar the in-repo test fixture writes.
pub fn from_blob(blob: &[u8]) -> SisoResult<(FieldData<f64>, Box<dyn Topology>, FieldData<f64>)> {
    let text = std::str::from_utf8(blob).map_err(|err| SisoError::DataFormatError {
        offset: err.valid_up_to(),
        message: "patch blob is not valid UTF-8".into(),
    })?;
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default().trim();

    if header.starts_with(LAGRANGIAN_HEADER) {
        parse_lagrangian(lines)
    } else if header.starts_with(LRSPLINE_HEADER) {
        parse_parametric(lines, true)
    } else {
        // No recognized tag: there was no header line to consume, so re-parse from the
        // start with the full text as body.
        parse_parametric(text.lines(), false)
    }
}

fn parse_prefixed_usizes<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    prefix: &str,
) -> SisoResult<Vec<usize>> {
    let line = lines.next().ok_or_else(|| SisoError::DataFormatError {
        offset: 0,
        message: format!("expected a `{prefix}` line, found end of blob"),
    })?;
    let line = line.trim();
    let rest = line
        .strip_prefix(prefix)
        .ok_or_else(|| SisoError::DataFormatError {
            offset: 0,
            message: format!("expected a line starting with `{prefix}`, found {line:?}"),
        })?;
    rest.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| SisoError::DataFormatError {
                    offset: 0,
                    message: format!("expected an integer, found {tok:?}"),
                })
        })
        .collect()
}

fn parse_header_fields<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
) -> SisoResult<(Vec<usize>, usize)> {
    let cell_shape = parse_prefixed_usizes(lines, "cells")?;
    let ncomps = parse_prefixed_usizes(lines, "ncomps")?
        .into_iter()
        .next()
        .ok_or_else(|| SisoError::DataFormatError {
            offset: 0,
            message: "ncomps line must carry exactly one integer".into(),
        })?;
    Ok((cell_shape, ncomps))
}

fn parse_controlpoints<'a>(
    lines: impl Iterator<Item = &'a str>,
    num_rows: usize,
    ncomps: usize,
) -> SisoResult<FieldData<f64>> {
    let mut data = Vec::with_capacity(num_rows * ncomps);
    let mut seen_rows = 0usize;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for tok in line.split_whitespace() {
            let value = tok.parse::<f64>().map_err(|_| SisoError::DataFormatError {
                offset: 0,
                message: format!("expected a float control-point value, found {tok:?}"),
            })?;
            data.push(value);
        }
        seen_rows += 1;
    }
    if seen_rows != num_rows {
        return Err(SisoError::DataFormatError {
            offset: 0,
            message: format!("expected {num_rows} control-point rows, found {seen_rows}"),
        });
    }
    FieldData::from_flat(data, ncomps)
}

fn parse_lagrangian<'a>(
    mut lines: impl Iterator<Item = &'a str>,
) -> SisoResult<(FieldData<f64>, Box<dyn Topology>, FieldData<f64>)> {
    let (cell_shape, ncomps) = parse_header_fields(&mut lines)?;
    let node_shape: Vec<usize> = cell_shape.iter().map(|c| c + 1).collect();
    let num_nodes: usize = node_shape.iter().product();
    let control_points = parse_controlpoints(lines, num_nodes, ncomps)?;
    let corners = control_points.corners(&node_shape)?;

    let structured = StructuredTopology::new(cell_shape);
    let (discrete, _mapper) = structured.discretize(1)?;
    Ok((corners, discrete, control_points))
}

fn parse_parametric<'a>(
    mut lines: impl Iterator<Item = &'a str>,
    is_lr: bool,
) -> SisoResult<(FieldData<f64>, Box<dyn Topology>, FieldData<f64>)> {
    let (cell_shape, ncomps) = parse_header_fields(&mut lines)?;
    let node_shape: Vec<usize> = cell_shape.iter().map(|c| c + 1).collect();
    let num_controlpoints: usize = node_shape.iter().product();
    let control_points = parse_controlpoints(lines, num_controlpoints, ncomps)?;
    let corners = control_points.corners(&node_shape)?;

    let evaluator = Arc::new(LinearEvaluator);
    let topology: Box<dyn Topology> = if is_lr {
        Box::new(LrTopology::new(cell_shape, evaluator))
    } else {
        Box::new(SplineTopology::new(cell_shape, evaluator))
    };
    Ok((corners, topology, control_points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::as_discrete;

    #[test]
    fn lagrangian_header_yields_discrete_topology() {
        let blob = "# LAGRANGIAN\ncells 1 1\nncomps 2\n0 0\n1 0\n0 1\n1 1\n";
        let (corners, topology, cps) = from_blob(blob.as_bytes()).unwrap();
        assert!(as_discrete(topology.as_ref()).is_some());
        assert_eq!(topology.num_cells(), 1);
        assert_eq!(cps.num_rows(), 4);
        assert_eq!(corners.num_rows(), 4); // 2^2 corners of a single quad cell
    }

    #[test]
    fn default_header_yields_spline_topology() {
        let blob = "cells 2\nncomps 1\n0\n1\n0\n";
        let (_corners, topology, _cps) = from_blob(blob.as_bytes()).unwrap();
        assert_eq!(topology.pardim(), 1);
        assert_eq!(topology.num_cells(), 2);
        assert!(as_discrete(topology.as_ref()).is_none());
    }

    #[test]
    fn lrspline_header_yields_lr_topology() {
        let blob = "# LRSPLINE\ncells 2\nncomps 1\n0\n1\n0\n";
        let (_corners, topology, _cps) = from_blob(blob.as_bytes()).unwrap();
        assert!(as_discrete(topology.as_ref()).is_none());
        assert_eq!(topology.num_cells(), 2);
    }

    #[test]
    fn malformed_body_raises_data_format_error() {
        let blob = "# LAGRANGIAN\ncells 1\nncomps not-a-number\n";
        assert!(matches!(
            from_blob(blob.as_bytes()),
            Err(SisoError::DataFormatError { .. })
        ));
    }
}
