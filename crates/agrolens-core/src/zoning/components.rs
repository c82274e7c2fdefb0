use ndarray::Array2;

/// One 4-connected run of same-zone pixels.
#[derive(Clone, Debug)]
pub struct Component {
    /// Unique label for this component.
    pub label: u32,
    /// Zone id shared by every pixel of the component.
    pub zone: u8,
    /// Number of pixels in the component.
    pub area: usize,
}

/// Label 4-connected components of equal non-zero zone ids using two-pass
/// labeling with union-find. Zone id 0 is background.
///
/// Returns the label grid (0 = background) and the components ordered by
/// label.
pub fn label_components(zone_map: &Array2<u8>) -> (Array2<u32>, Vec<Component>) {
    let (h, w) = zone_map.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return (labels, Vec::new());
    }

    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0; h * w / 2 + 2];

    // Pass 1: provisional labels.
    for row in 0..h {
        for col in 0..w {
            let zone = zone_map[[row, col]];
            if zone == 0 {
                continue;
            }

            let up = if row > 0 && zone_map[[row - 1, col]] == zone {
                labels[[row - 1, col]]
            } else {
                0
            };
            let left = if col > 0 && zone_map[[row, col - 1]] == zone {
                labels[[row, col - 1]]
            } else {
                0
            };

            labels[[row, col]] = match (up > 0, left > 0) {
                (false, false) => {
                    if next_label as usize >= parent.len() {
                        parent.resize(parent.len() * 2, 0);
                    }
                    parent[next_label as usize] = next_label;
                    next_label += 1;
                    next_label - 1
                }
                (true, false) => up,
                (false, true) => left,
                (true, true) => {
                    if up != left {
                        union(&mut parent, up, left);
                    }
                    up.min(left)
                }
            };
        }
    }

    for i in 1..next_label as usize {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve to roots, renumber densely in scan order.
    let mut dense = vec![0u32; next_label as usize];
    let mut components: Vec<Component> = Vec::new();
    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize] as usize;
            if dense[root] == 0 {
                components.push(Component {
                    label: components.len() as u32 + 1,
                    zone: zone_map[[row, col]],
                    area: 0,
                });
                dense[root] = components.len() as u32;
            }
            let resolved = dense[root];
            labels[[row, col]] = resolved;
            components[resolved as usize - 1].area += 1;
        }
    }

    (labels, components)
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
