//? mpirun -n 4 --features "mpi"
use meshsort::generate::random_dataset;
use meshsort::transport::{MpiTransport, Transport};
use meshsort::{Capacity, MeshConfig, MeshSorter};

fn main() {
    // Setup MPI
    let universe = mpi::initialize().unwrap();
    let transport = MpiTransport::new(universe.world());
    let size = transport.size();

    let config = MeshConfig::new(size, Capacity::default()).unwrap();
    let sorter = MeshSorter::new(&transport, config).unwrap();

    // 64 characters per participant, generated on the root only
    let dataset = sorter.is_root().then(|| random_dataset(64 * size, Some(0)));
    let report = sorter.sort_dataset(dataset.as_deref()).unwrap();

    if let (Some(output), Some(dataset)) = (report.output, dataset) {
        // Test that the output is a sorted permutation of the input
        let mut expected = dataset.clone();
        expected.sort();
        assert_eq!(output, expected);

        for i in 0..(output.len() - 1) {
            assert!(output[i] <= output[i + 1]);
        }
        println!(
            "sorted {} characters on {} ranks in {:?}",
            output.len(),
            size,
            report.timings.total()
        );
    } else {
        assert!(!sorter.is_root());
    }
}
