use std::f32::consts::{PI, TAU};

use crate::framework::gpu::vertices::{ColorVertex, MeshVertex};

/// Immutable shape data shared by surfaces.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Indexed triangle list
    Mesh {
        vertices: Vec<MeshVertex>,
        indices:  Vec<u32>,
    },
    /// Cloud of colored points drawn as sprites
    Points {
        points: Vec<ColorVertex>,
    },
}

const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = {
    const T: f32 = 1.618_034; // golden ratio
    [
        [-1.0,  T, 0.0], [ 1.0,  T, 0.0], [-1.0, -T, 0.0], [ 1.0, -T, 0.0],
        [ 0.0, -1.0,  T], [ 0.0, 1.0,  T], [ 0.0, -1.0, -T], [ 0.0, 1.0, -T],
        [  T, 0.0, -1.0], [  T, 0.0, 1.0], [ -T, 0.0, -1.0], [ -T, 0.0, 1.0],
    ]
};

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

// Factories
impl Geometry {

    /// Icosahedron projected onto a sphere, each face is split into `(detail + 1)^2` triangles.
    /// Vertices are not shared between triangles so that texture seam can be fixed per triangle.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let columns = detail as usize + 1;
        let mut positions: Vec<glam::Vec3> = Vec::with_capacity(20 * columns * columns * 3);

        for [a, b, c] in ICOSAHEDRON_FACES {
            subdivide_face(
                glam::Vec3::from(ICOSAHEDRON_VERTICES[a]),
                glam::Vec3::from(ICOSAHEDRON_VERTICES[b]),
                glam::Vec3::from(ICOSAHEDRON_VERTICES[c]),
                columns,
                &mut positions,
            );
        }

        let mut vertices: Vec<MeshVertex> = positions
            .iter()
            .map(|p| {
                let normal = p.normalize();
                MeshVertex {
                    position: normal * radius,
                    normal,
                    uv: spherical_uv(normal),
                }
            })
            .collect();

        for triangle in vertices.chunks_exact_mut(3) {
            fix_triangle_uvs(triangle);
        }

        let indices = (0..vertices.len() as u32).collect();
        Geometry::Mesh { vertices, indices }
    }

    /// Latitude-longitude sphere.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = glam::vec3(
                    -(u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                );
                vertices.push(MeshVertex {
                    position: normal * radius,
                    normal,
                    uv: glam::vec2(u, v),
                });
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Geometry::Mesh { vertices, indices }
    }

    pub fn points(points: Vec<ColorVertex>) -> Self {
        Geometry::Points { points }
    }
}

// Getters
impl Geometry {
    pub fn triangle_count(&self) -> usize {
        match self {
            Geometry::Mesh { indices, .. } => indices.len() / 3,
            Geometry::Points { .. } => 0,
        }
    }

    pub fn is_points(&self) -> bool {
        matches!(self, Geometry::Points { .. })
    }
}

/// Splits triangle `abc` into a grid of `columns^2` triangles, pushing three positions per triangle.
fn subdivide_face(a: glam::Vec3, b: glam::Vec3, c: glam::Vec3, columns: usize, out: &mut Vec<glam::Vec3>) {
    let mut grid: Vec<Vec<glam::Vec3>> = Vec::with_capacity(columns + 1);
    for i in 0..=columns {
        let t = i as f32 / columns as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = columns - i;
        let row = (0..=rows)
            .map(|j| if rows == 0 { aj } else { aj.lerp(bj, j as f32 / rows as f32) })
            .collect();
        grid.push(row);
    }

    for i in 0..columns {
        for j in 0..(2 * (columns - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                out.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
}

fn azimuth(direction: glam::Vec3) -> f32 {
    direction.z.atan2(-direction.x)
}

/// Equirectangular mapping, `v = 0` at north pole which is the top row of an image.
fn spherical_uv(direction: glam::Vec3) -> glam::Vec2 {
    let inclination = (-direction.y).atan2(glam::vec2(direction.x, direction.z).length());
    glam::vec2(azimuth(direction) / TAU + 0.5, inclination / PI + 0.5)
}

/// Removes texture stretching of triangles crossing the `u` seam or touching a pole.
fn fix_triangle_uvs(triangle: &mut [MeshVertex]) {
    // Pole vertex has undefined azimuth, take it from the centroid of the triangle
    let centroid = triangle.iter().map(|v| v.normal).sum::<glam::Vec3>() / 3.0;
    let centroid_u = azimuth(centroid) / TAU + 0.5;
    for vertex in triangle.iter_mut() {
        if vertex.normal.x.abs() < 1e-6 && vertex.normal.z.abs() < 1e-6 {
            vertex.uv.x = centroid_u;
        }
    }

    let (min_u, max_u) = triangle
        .iter()
        .fold((f32::MAX, f32::MIN), |(min, max), v| (min.min(v.uv.x), max.max(v.uv.x)));

    if max_u - min_u > 0.5 {
        for vertex in triangle.iter_mut() {
            if vertex.uv.x < 0.5 {
                vertex.uv.x += 1.0;
            }
        }
    }
}
