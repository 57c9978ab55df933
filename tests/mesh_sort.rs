use meshsort::generate::random_dataset;
use meshsort::sort::{local_rank, sorted_reference};
use meshsort::transport::{LocalMesh, Transport};
use meshsort::{sort_on_local_mesh, Capacity, Error, MeshConfig, MeshSorter, Phase};

fn serial_sort(dataset: &[u8]) -> Vec<u8> {
    let mut sorted = dataset.to_vec();
    sorted.sort();
    sorted
}

fn chunk_of(dataset: &[u8], participants: usize, id: usize) -> Vec<u8> {
    let len = dataset.len() / participants;
    dataset[id * len..(id + 1) * len].to_vec()
}

#[test]
fn test_sorts_on_every_mesh_size() {
    for side in 1..=5 {
        let participants = side * side;
        let config = MeshConfig::new(participants, Capacity::default()).unwrap();
        for (seed, chunk_len) in [(0, 1), (1, 3), (2, 17)] {
            let dataset = random_dataset(participants * chunk_len, Some(seed));
            let report = sort_on_local_mesh(config, &dataset).unwrap();
            assert_eq!(report.output.unwrap(), serial_sort(&dataset));
        }
    }
}

#[test]
fn test_duplicate_heavy_input() {
    let dataset: Vec<u8> = (0..360).map(|i| b"aab"[(i * 7 + i / 5) % 3]).collect();
    let config = MeshConfig::new(9, Capacity::default()).unwrap();
    let report = sort_on_local_mesh(config, &dataset).unwrap();
    assert_eq!(report.output.unwrap(), serial_sort(&dataset));
}

#[test]
fn test_reverse_order_single_characters() {
    let dataset = b"DCBA";
    let config = MeshConfig::new(4, Capacity::default()).unwrap();

    let tables = LocalMesh::new(4)
        .run(|t| {
            let sorter = MeshSorter::new(t, config)?;
            let column = sorter.gossip(chunk_of(dataset, 4, t.id()))?.concatenate();
            let row_data = sorter.broadcast(&column)?;
            t.barrier()?;
            let ranks = local_rank(&sorted_reference(&column), &row_data);
            match sorter.reduce_row(ranks)? {
                Some(aggregated) => sorter.gather(row_data, aggregated),
                None => Ok(None),
            }
        })
        .unwrap();

    let table = tables[0].as_ref().unwrap();
    assert!(tables[1..].iter().all(Option::is_none));
    assert_eq!(table.data(), b"DBCA");
    for (&c, &rank) in table.data().iter().zip(table.ranks()) {
        assert_eq!(rank, (c - b'A') as usize);
    }
    assert_eq!(table.merge(), b"ABCD".to_vec());

    let report = sort_on_local_mesh(config, dataset).unwrap();
    assert_eq!(report.output.unwrap(), b"ABCD".to_vec());
}

#[test]
fn test_identical_characters_rank_zero() {
    let dataset = b"AAAA";
    let config = MeshConfig::new(4, Capacity::default()).unwrap();

    let aggregated = LocalMesh::new(4)
        .run(|t| {
            let sorter = MeshSorter::new(t, config)?;
            let column = sorter.gossip(chunk_of(dataset, 4, t.id()))?.concatenate();
            let row_data = sorter.broadcast(&column)?;
            sorter.reduce_row(local_rank(&sorted_reference(&column), &row_data))
        })
        .unwrap();
    for ranks in aggregated.into_iter().flatten() {
        assert_eq!(ranks, vec![0, 0]);
    }

    let report = sort_on_local_mesh(config, dataset).unwrap();
    assert_eq!(report.output.unwrap(), b"AAAA".to_vec());
}

#[test]
fn test_column_and_row_consistency() {
    let side = 3;
    let participants = side * side;
    let dataset = random_dataset(participants * 5, Some(42));
    let config = MeshConfig::new(participants, Capacity::default()).unwrap();

    let views = LocalMesh::new(participants)
        .run(|t| {
            let sorter = MeshSorter::new(t, config)?;
            let assembly = sorter.gossip(chunk_of(&dataset, participants, t.id()))?;
            let column = assembly.concatenate();
            let row_data = sorter.broadcast(&column)?;
            Ok((assembly.origins().collect::<Vec<_>>(), column, row_data))
        })
        .unwrap();

    let topology = config.topology();
    for id in 0..participants {
        let (row, col) = topology.coordinates(id);
        let (origins, column, row_data) = &views[id];

        // Column content is every member's chunk in ascending origin order.
        let members: Vec<usize> = topology.column_members(col).collect();
        assert_eq!(origins, &members);
        let expected: Vec<u8> = members
            .iter()
            .flat_map(|&member| chunk_of(&dataset, participants, member))
            .collect();
        assert_eq!(column, &expected);

        // Row data is the diagonal's own column content.
        let diagonal = topology.diagonal(row);
        assert_eq!(row_data, &views[diagonal].1);
    }
}

fn expect_capacity_error(config: MeshConfig, dataset: &[u8], expected: (Phase, usize, usize)) {
    match sort_on_local_mesh(config, dataset) {
        Err(Error::CapacityExceeded {
            phase,
            len,
            capacity,
        }) => assert_eq!((phase, len, capacity), expected),
        other => panic!("expected a capacity error, got {other:?}"),
    }
}

#[test]
fn test_capacity_boundary() {
    // 2 x 2 mesh, chunks of 4 bytes: a row holds 8 characters, so its rank vector is 32 bytes,
    // the largest message of the run.
    let dataset = random_dataset(16, Some(9));

    let exact = MeshConfig::new(4, Capacity::new(32)).unwrap();
    let report = sort_on_local_mesh(exact, &dataset).unwrap();
    assert_eq!(report.output.unwrap(), serial_sort(&dataset));

    let short = MeshConfig::new(4, Capacity::new(31)).unwrap();
    expect_capacity_error(short, &dataset, (Phase::Reduce, 32, 31));
}

#[test]
fn test_capacity_rejects_row_broadcast() {
    let dataset = random_dataset(16, Some(9));
    let config = MeshConfig::new(4, Capacity::new(7)).unwrap();
    expect_capacity_error(config, &dataset, (Phase::Broadcast, 8, 7));
}

#[test]
fn test_unequal_chunks_are_rejected() {
    let config = MeshConfig::new(9, Capacity::default()).unwrap();
    let dataset = random_dataset(9 * 3, Some(13));
    let outcome = LocalMesh::new(9).run(|t| {
        let sorter = MeshSorter::new(t, config)?;
        let mut chunk = chunk_of(&dataset, 9, t.id());
        if t.id() == 4 {
            chunk.push(b'z');
        }
        sorter.sort_chunk(chunk)
    });
    match outcome {
        Err(Error::Protocol(message)) => assert!(message.contains("received a chunk of")),
        other => panic!("expected a protocol error, got {other:?}"),
    }
}

#[test]
fn test_uneven_dataset_is_rejected() {
    let config = MeshConfig::new(4, Capacity::default()).unwrap();
    assert!(matches!(
        sort_on_local_mesh(config, b"ABCDE"),
        Err(Error::UnevenPartition {
            len: 5,
            participants: 4
        })
    ));
    assert!(matches!(
        sort_on_local_mesh(config, b""),
        Err(Error::EmptyChunk { .. })
    ));
}

#[test]
fn test_transport_must_match_mesh() {
    let config = MeshConfig::new(9, Capacity::default()).unwrap();
    let outcome = LocalMesh::new(4).run(|t| MeshSorter::new(t, config).map(|_| ()));
    assert!(matches!(
        outcome,
        Err(Error::MeshMismatch {
            expected: 9,
            actual: 4
        })
    ));
}

#[test]
fn test_only_root_has_output() {
    let dataset = random_dataset(9 * 4, Some(5));
    let config = MeshConfig::new(9, Capacity::default()).unwrap();
    let reports = LocalMesh::new(9)
        .run(|t| {
            let sorter = MeshSorter::new(t, config)?;
            sorter.sort_chunk(chunk_of(&dataset, 9, t.id()))
        })
        .unwrap();

    assert_eq!(reports[0].output.as_deref(), Some(&serial_sort(&dataset)[..]));
    assert!(reports[1..].iter().all(|r| r.output.is_none()));
    assert!(reports.iter().all(|r| r.timings.total() >= r.timings.execution()));
}
