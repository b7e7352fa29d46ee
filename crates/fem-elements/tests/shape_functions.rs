/// Shape function properties over random natural coordinates
///
/// For every topology, 60 points are drawn inside the natural domain and the
/// basis is checked for partition of unity, zero gradient sum and exact
/// reproduction of linear fields.
use fem_elements::shape::{coords_are_inside, shape_gradients, shape_values};
use fem_elements::Topology;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 60;

fn random_inside(topology: Topology, rng: &mut StdRng) -> Vector3<f64> {
    loop {
        let s = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if coords_are_inside(topology, &s) {
            return s;
        }
    }
}

/// Like [`random_inside`], but keeps central differences off the pyramid apex,
/// where the rational terms are not differentiable.
fn random_off_apex(topology: Topology, rng: &mut StdRng) -> Vector3<f64> {
    loop {
        let s = random_inside(topology, rng);
        let near_apex = matches!(topology, Topology::Pyramid | Topology::QuadPyramid) && s.z > 0.95;
        if !near_apex {
            return s;
        }
    }
}

#[test]
fn test_partition_of_unity() {
    let mut rng = StdRng::seed_from_u64(7);
    for topology in Topology::ALL {
        for _ in 0..SAMPLES {
            let s = random_inside(topology, &mut rng);
            let sum = shape_values(topology, &s).sum();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "{:?}: sum N = {} at {:?}",
                topology,
                sum,
                s
            );

            let grad_sum = shape_gradients(topology, &s)
                .iter()
                .fold(Vector3::<f64>::zeros(), |acc, g| acc + g);
            assert!(
                grad_sum.norm() < 1e-11,
                "{:?}: sum dN/ds = {:?} at {:?}",
                topology,
                grad_sum,
                s
            );
        }
    }
}

#[test]
fn test_partition_of_unity_near_pyramid_apex() {
    let mut rng = StdRng::seed_from_u64(31);
    for topology in [Topology::Pyramid, Topology::QuadPyramid] {
        for _ in 0..SAMPLES {
            let z: f64 = rng.gen_range(0.95..1.0);
            let a = 1.0 - z;
            let s = Vector3::new(rng.gen_range(-a..=a), rng.gen_range(-a..=a), z);
            let sum = shape_values(topology, &s).sum();
            assert!((sum - 1.0).abs() < 1e-12, "{:?}: sum N = {} at {:?}", topology, sum, s);

            let grad_sum = shape_gradients(topology, &s)
                .iter()
                .fold(Vector3::<f64>::zeros(), |acc, g| acc + g);
            assert!(grad_sum.norm() < 1e-11, "{:?}: sum dN/ds = {:?} at {:?}", topology, grad_sum, s);
        }
    }
}

#[test]
fn test_linear_fields_are_reproduced() {
    let mut rng = StdRng::seed_from_u64(11);
    for topology in Topology::ALL {
        let coords = topology.node_coords();
        for _ in 0..SAMPLES {
            let s = random_inside(topology, &mut rng);
            let n = shape_values(topology, &s);
            let mut x = Vector3::<f64>::zeros();
            for (i, c) in coords.iter().enumerate() {
                x += Vector3::new(c[0], c[1], c[2]) * n[i];
            }
            // shell bases are planar; the thickness coordinate is not interpolated
            let dims = if topology.is_shell() { 2 } else { 3 };
            for d in 0..dims {
                assert!(
                    (x[d] - s[d]).abs() < 1e-12,
                    "{:?}: interpolated s{} = {} vs {}",
                    topology,
                    d,
                    x[d],
                    s[d]
                );
            }
        }
    }
}

#[test]
fn test_gradients_are_consistent_with_values() {
    let mut rng = StdRng::seed_from_u64(23);
    let h = 1e-6;
    for topology in Topology::ALL {
        for _ in 0..SAMPLES {
            let s = random_off_apex(topology, &mut rng);
            let grads = shape_gradients(topology, &s);
            for d in 0..3 {
                let mut plus = s;
                let mut minus = s;
                plus[d] += h;
                minus[d] -= h;
                let fd = (shape_values(topology, &plus) - shape_values(topology, &minus)) / (2.0 * h);
                for (i, g) in grads.iter().enumerate() {
                    assert!(
                        (g[d] - fd[i]).abs() < 1e-5,
                        "{:?}: dN{}/ds{} = {} vs {} at {:?}",
                        topology,
                        i,
                        d,
                        g[d],
                        fd[i],
                        s
                    );
                }
            }
        }
    }
}

#[test]
fn test_pressure_basis_sizes() {
    let s = Vector3::new(0.1, 0.2, 0.3);
    let expected = [1, 1, 1, 1, 4, 4, 2, 1, 0, 0];
    for (topology, &npvals) in Topology::ALL.iter().zip(&expected) {
        assert_eq!(topology.num_pressure_values(), npvals, "{:?}", topology);
        assert_eq!(fem_elements::shape::pressure_values(*topology, &s).len(), npvals);
    }
}
