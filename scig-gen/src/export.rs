//! Plain-data views of the finished instance.
//!
//! Downstream exporters and visualizers consume these structures; nothing
//! here computes presentation, and nothing here mutates the data model.

use itertools::Itertools;
use petgraph::visit::EdgeRef;

use crate::assemble::Assignment;
use crate::matrix::FacilityMatrices;
use crate::model::{
    BomGraph,
    Facility,
};

/// BOM edges as `(source id, target id, weight)` triples, in insertion
/// order.
#[must_use]
pub fn edge_list(graph: &BomGraph) -> Vec<(usize, usize, u32)> {
    graph
        .edge_references()
        .map(|edge| (edge.source().index(), edge.target().index(), *edge.weight()))
        .collect()
}

/// Per-item demand, indexed by item id.
#[must_use]
pub fn demand_map(graph: &BomGraph) -> Vec<u64> {
    graph.node_indices().map(|node| graph[node].demand).collect()
}

/// The `n x (n + 1)` BOM matrix: entry `[u][v]` is the weight of edge
/// `u -> v` (zero if absent), and the final column holds each item's
/// demand.
#[must_use]
pub fn bom_matrix(graph: &BomGraph) -> Vec<Vec<u64>> {
    let n = graph.node_count();
    let mut matrix = vec![vec![0_u64; n + 1]; n];

    for edge in graph.edge_references() {
        matrix[edge.source().index()][edge.target().index()] = u64::from(*edge.weight());
    }
    for node in graph.node_indices() {
        matrix[node.index()][n] = graph[node].demand;
    }

    matrix
}

/// An item-by-facility table with a header row, ready for CSV/TSV sinks.
///
/// The first column holds the item id, the remaining columns one facility
/// each.
#[must_use]
pub fn item_facility_table(values: &[Vec<u64>]) -> Vec<Vec<String>> {
    let num_facilities = values.first().map_or(0, Vec::len);
    let mut rows = Vec::with_capacity(values.len() + 1);

    let mut header = vec!["item".to_owned()];
    header.extend((0..num_facilities).map(|id| format!("facility_{id}")));
    rows.push(header);

    for (item, row) in values.iter().enumerate() {
        let mut cells = vec![item.to_string()];
        cells.extend(row.iter().map(ToString::to_string));
        rows.push(cells);
    }

    rows
}

/// The node-facility mapping as a 0/1 indicator table with a header row.
#[must_use]
pub fn site_map_table(assignment: &Assignment, num_facilities: usize) -> Vec<Vec<String>> {
    let indicators: Vec<Vec<u64>> = assignment
        .site_map
        .iter()
        .enumerate()
        .map(|(item, _)| {
            (0..num_facilities)
                .map(|facility| u64::from(assignment.is_mapped(item, facility)))
                .collect()
        })
        .collect();
    item_facility_table(&indicators)
}

/// The facility table with a header row: attributes followed by the full
/// distance and transport-emission rows.
#[must_use]
pub fn facility_table(facilities: &[Facility], matrices: &FacilityMatrices) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(facilities.len() + 1);

    let mut header = vec![
        "id".to_owned(),
        "lat".to_owned(),
        "lon".to_owned(),
        "lead_time".to_owned(),
        "service_index".to_owned(),
        "capacity".to_owned(),
    ];
    header.extend(facilities.iter().map(|f| format!("dist_km_{}", f.id)));
    header.extend(facilities.iter().map(|f| format!("tghg_{}", f.id)));
    rows.push(header);

    for facility in facilities {
        let mut cells = vec![
            facility.id.to_string(),
            facility.lat.to_string(),
            facility.lon.to_string(),
            facility.lead_time.to_string(),
            facility.service_index.to_string(),
            facility.capacity.to_string(),
        ];
        cells.extend(matrices.distance_km[facility.id].iter().map(ToString::to_string));
        cells.extend(matrices.transport_emission[facility.id].iter().map(ToString::to_string));
        rows.push(cells);
    }

    rows
}

/// Render the longest path as `a -> b -> c` for the text report.
#[must_use]
pub fn format_path(path: &[usize]) -> String {
    path.iter().map(ToString::to_string).join(" -> ")
}

#[cfg(test)]
mod tests {
    use petgraph::graph::NodeIndex;

    use super::*;
    use crate::matrix::build_matrices;
    use crate::model::Item;

    /// 0 -> 1 (weight 3), 0 -> 2 (weight 5); demands on the two leaves.
    fn small_graph() -> BomGraph {
        let mut graph = BomGraph::new();
        for id in 0..3 {
            graph.add_node(Item { id, demand: 0 });
        }
        graph.add_edge(NodeIndex::new(0), NodeIndex::new(1), 3);
        graph.add_edge(NodeIndex::new(0), NodeIndex::new(2), 5);
        graph[NodeIndex::new(1)].demand = 20;
        graph[NodeIndex::new(2)].demand = 30;
        graph
    }

    #[test]
    fn bom_matrix_has_weights_and_a_demand_column() {
        let matrix = bom_matrix(&small_graph());
        assert_eq!(
            matrix,
            vec![
                vec![0, 3, 5, 0],
                vec![0, 0, 0, 20],
                vec![0, 0, 0, 30],
            ]
        );
    }

    #[test]
    fn edge_list_and_demand_map_round_out_the_graph_views() {
        let graph = small_graph();
        assert_eq!(edge_list(&graph), vec![(0, 1, 3), (0, 2, 5)]);
        assert_eq!(demand_map(&graph), vec![0, 20, 30]);
        assert_eq!(format_path(&[0, 2]), "0 -> 2");
    }

    #[test]
    fn item_facility_table_carries_a_header_row() {
        let table = item_facility_table(&[vec![0, 7], vec![9, 0]]);
        assert_eq!(table[0], vec!["item", "facility_0", "facility_1"]);
        assert_eq!(table[1], vec!["0", "0", "7"]);
        assert_eq!(table[2], vec!["1", "9", "0"]);
    }

    #[test]
    fn facility_table_includes_matrix_rows() {
        let facilities = vec![
            Facility { id: 0, lat: 0.0, lon: 0.0, lead_time: 2, service_index: 1, capacity: 50 },
            Facility { id: 1, lat: 0.0, lon: 1.0, lead_time: 4, service_index: 9, capacity: 80 },
        ];
        let matrices = build_matrices(&facilities);
        let table = facility_table(&facilities, &matrices);

        assert_eq!(table.len(), 3);
        // 6 attribute columns + 2 distance + 2 emission columns.
        assert!(table.iter().all(|row| row.len() == 10));
        assert_eq!(table[0][6], "dist_km_0");
        assert_eq!(table[1][6], "0");
    }
}
