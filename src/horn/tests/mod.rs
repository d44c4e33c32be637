mod test_profile_basic;

use std::collections::HashMap;

use crate::geom::HornMesh;

/// Undirected edges used by exactly one triangle.
fn boundary_edges(mesh: &HornMesh) -> Vec<(u32, u32)> {
    let mut uses: HashMap<(u32, u32), usize> = HashMap::new();
    for tri in mesh.indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            *uses.entry((a.min(b), a.max(b))).or_default() += 1;
        }
    }
    let mut edges: Vec<_> = uses.into_iter().filter(|&(_, n)| n == 1).map(|(e, _)| e).collect();
    edges.sort_unstable();
    edges
}
