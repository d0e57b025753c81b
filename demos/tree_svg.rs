use kdthree::{BoundingBox, KdNode, KdTree, KdTreeOptions};
use plotters::prelude::*;
use rand::Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_demo("kdtree_midpoint.svg", KdTreeOptions::default())?;
    run_demo(
        "kdtree_balanced.svg",
        KdTreeOptions {
            balanced: true,
            ..KdTreeOptions::default()
        },
    )?;
    Ok(())
}

/// Draws the xy-projection of the tree's leaf cells, all indexed points, and
/// one query with its 10 nearest neighbors highlighted.
fn run_demo(filename: &str, options: KdTreeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(filename, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root).build_cartesian_2d(0.0..100.0, 0.0..100.0)?;

    let mut rng = rand::thread_rng();
    let mut points = Vec::with_capacity(1000);
    for _ in 0..1000 {
        points.push([
            rng.gen_range(0.0..100.0),
            rng.gen_range(0.0..100.0),
            rng.gen_range(0.0..100.0),
        ]);
    }

    let tree = KdTree::build_with(&points, options)?;
    println!(
        "{}: {} nodes, depth {}",
        filename,
        tree.nodes().len(),
        tree.depth()
    );

    // Leaf cells as rectangles around their point ranges
    for node in tree.nodes() {
        if let KdNode::Leaf { start, size } = *node {
            let range = &tree.points()[start as usize..(start + size) as usize];
            let cell = BoundingBox::from_points(range);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(cell.min[0], cell.min[1]), (cell.max[0], cell.max[1])],
                BLUE.mix(0.4).stroke_width(1),
            )))?;
        }
    }

    // All points
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p[0], p[1]), 2, BLACK.filled())),
    )?;

    // One query and its neighbors
    let query = [50.0, 50.0, 50.0];
    let neighbors = tree.k_nearest_sorted(query, 10)?;
    chart.draw_series(neighbors.iter().map(|&(index, _)| {
        let p = points[index];
        Circle::new((p[0], p[1]), 4, GREEN.filled())
    }))?;
    chart.draw_series(std::iter::once(Circle::new(
        (query[0], query[1]),
        5,
        RED.filled(),
    )))?;

    root.present()?;
    Ok(())
}
