use arbitrary::{Arbitrary, Unstructured};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;

use crate::rbt::{LessFn, Reverse};

// keys order by the first member only, second member tracks insertion.
type Key = (u16, u32);
type KeyLess = LessFn<fn(&Key, &Key) -> bool>;

fn key_less(a: &Key, b: &Key) -> bool {
    a.0 < b.0
}

fn new_index(name: &str) -> Index<Key, KeyLess> {
    Index::with_compare(name, LessFn(key_less as fn(&Key, &Key) -> bool))
}

// position of the n-th entry, walking forward from begin.
fn nth_pos<C>(index: &Index<Key, C>, n: usize) -> Position {
    let mut pos = index.begin();
    for _ in 0..n {
        pos = index.next_pos(pos).unwrap();
    }
    pos
}

fn model_insert(refs: &mut Vec<Key>, key: Key) {
    let off = refs.iter().take_while(|k| k.0 <= key.0).count();
    refs.insert(off, key);
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(u16),
    Load(u16, u16, u16),
    Erase(u16),
    EraseNth(u16),
    Modify(u16, u16),
    Find(u16),
    Walk(u16),
}

#[test]
fn test_rbt_ops() {
    let seed: u64 = random();
    println!("test_rbt_ops seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let n_ops = 10_000;
    let key_max = 1 + (rng.gen::<u16>() % 256);
    println!("test_rbt_ops n_ops:{} key_max:{}", n_ops, key_max);

    let mut index = new_index("test_rbt_ops");
    let mut refs: Vec<Key> = vec![];
    let mut seqno = 0_u32;
    let mut counts = [0_usize; 6];

    for i in 0..n_ops {
        let bytes = rng.gen::<[u8; 32]>();
        let mut uns = Unstructured::new(&bytes);

        let op: Op = uns.arbitrary().unwrap();
        match op {
            Op::Insert(k) => {
                seqno += 1;
                let key = (k % key_max, seqno);
                let pos = index.insert(key).unwrap();
                assert_eq!(index.get(pos), Some(&key));
                model_insert(&mut refs, key);
                counts[0] += 1;
            }
            Op::Load(a, b, c) => {
                for k in [a, b, c].iter() {
                    seqno += 1;
                    let key = (k % key_max, seqno);
                    index.insert(key).unwrap();
                    model_insert(&mut refs, key);
                }
                counts[0] += 3;
            }
            Op::Erase(k) => {
                let k = k % key_max;
                let pos = index.find(&(k, 0));
                if pos.is_end() {
                    assert!(refs.iter().all(|key| key.0 != k));
                } else {
                    let (key, _) = index.take(pos).unwrap();
                    assert_eq!(key.0, k);
                    let off = refs.iter().position(|r| *r == key).unwrap();
                    refs.remove(off);
                    assert_eq!(index.get(pos), None);
                }
                counts[1] += 1;
            }
            Op::EraseNth(n) if !refs.is_empty() => {
                let n = (n as usize) % refs.len();
                let pos = nth_pos(&index, n);
                let (key, next) = index.take(pos).unwrap();
                assert_eq!(key, refs.remove(n));
                assert_eq!(index.get(next), refs.get(n));
                counts[2] += 1;
            }
            Op::Modify(n, k) if !refs.is_empty() => {
                let n = (n as usize) % refs.len();
                let pos = nth_pos(&index, n);
                seqno += 1;
                let key = (k % key_max, seqno);
                let npos = index.modify(pos, key).unwrap();
                if refs[n].0 == key.0 {
                    assert_eq!(npos, pos);
                    assert_eq!(index.get(npos), Some(&refs[n]));
                } else {
                    assert_eq!(index.get(npos), Some(&key));
                    refs.remove(n);
                    model_insert(&mut refs, key);
                }
                counts[3] += 1;
            }
            Op::Find(k) => {
                let k = k % key_max;
                let pos = index.find(&(k, 0));
                match index.get(pos) {
                    Some(key) => assert_eq!(key.0, k),
                    None => assert!(refs.iter().all(|key| key.0 != k)),
                }
                assert_eq!(index.contains(&(k, 0)), !pos.is_end());
                counts[4] += 1;
            }
            Op::Walk(n) => {
                // end marker and entries form a ring.
                let (steps, ring) = ((n as usize) % 8, refs.len() + 1);
                let mut pos = index.end();
                for _ in 0..steps {
                    pos = index.prev_pos(pos).unwrap();
                }
                let off = (refs.len() + ring * 8 - steps) % ring;
                assert_eq!(index.get(pos), refs.get(off));
                counts[5] += 1;
            }
            _ => (),
        }

        assert_eq!(index.len(), refs.len());
        if i % 1000 == 0 {
            index.validate().unwrap();
        }
    }

    println!("test_rbt_ops counts:{:?} len:{}", counts, index.len());

    let stats = index.validate().unwrap();
    assert_eq!(stats.n_count, refs.len());
    let keys: Vec<Key> = index.iter().cloned().collect();
    assert_eq!(keys, refs);
    let keys: Vec<Key> = index.iter().rev().cloned().collect();
    let revs: Vec<Key> = refs.iter().rev().cloned().collect();
    assert_eq!(keys, revs);

    let (mut pos, mut n) = (index.begin(), 0);
    while !pos.is_end() {
        n += 1;
        pos = index.next_pos(pos).unwrap();
    }
    assert_eq!(n, index.len());
}

#[test]
fn test_rbt_empty() {
    let mut index: Index<u64> = Index::new("test_rbt_empty");
    assert_eq!(index.len(), 0);
    assert_eq!(index.is_empty(), true);
    assert_eq!(index.height(), 0);
    assert_eq!(index.first(), None);
    assert_eq!(index.last(), None);
    assert_eq!(index.begin(), index.end());
    assert_eq!(index.to_root().is_end(), true);
    assert_eq!(index.find(&10).is_end(), true);
    assert_eq!(index.contains(&10), false);
    assert_eq!(index.remove(&10), None);
    assert_eq!(index.get(index.end()), None);
    assert_eq!(index.iter().next(), None);

    let end = index.end();
    assert_eq!(index.next_pos(end).unwrap(), end);
    assert_eq!(index.prev_pos(end).unwrap(), end);
    match index.erase(end) {
        Err(Error::InvalidPosition(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match index.preorder_from(end, |_| ()) {
        Err(Error::InvalidPosition(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    let stats = index.validate().unwrap();
    assert_eq!(stats.n_count, 0);
    assert_eq!(stats.blacks, Some(0));
    assert_eq!(stats.height, Some(0));
}

#[test]
fn test_rbt_ring() {
    let mut index: Index<u64> = Index::new("test_rbt_ring");
    index.insert_all(vec![2, 3, 1]).unwrap();
    assert_eq!(index.first(), Some(&1));
    assert_eq!(index.last(), Some(&3));

    let (begin, end) = (index.begin(), index.end());
    assert_eq!(index.get(begin), Some(&1));
    let last = index.prev_pos(end).unwrap();
    assert_eq!(index.get(last), Some(&3));
    assert_eq!(index.next_pos(last).unwrap(), end);
    assert_eq!(index.next_pos(end).unwrap(), begin);
    assert_eq!(index.prev_pos(begin).unwrap(), end);
    assert_eq!(index.get(index.to_root()), Some(&2));
}

#[test]
fn test_rbt_position() {
    let mut index: Index<u64> = Index::new("test_rbt_position");
    let mut other: Index<u64> = Index::new("test_rbt_position");
    index.insert_all(0..10).unwrap();
    other.insert_all(0..10).unwrap();

    // foreign position, even when slots line up.
    let pos = other.find(&5);
    assert_eq!(index.get(pos), None);
    match index.erase(pos) {
        Err(Error::InvalidPosition(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match index.next_pos(other.end()) {
        Err(Error::InvalidPosition(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    // stale position, even after its slot is re-used.
    let pos = index.find(&5);
    let keep = index.find(&6);
    assert_eq!(index.erase(pos).unwrap(), keep);
    index.insert(5).unwrap();
    assert_eq!(index.get(pos), None);
    match index.erase(pos) {
        Err(Error::InvalidPosition(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match index.modify(pos, 100) {
        Err(Error::InvalidPosition(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(index.get(keep), Some(&6));

    // positions survive unrelated mutations.
    let refs: Vec<(u64, Position)> = (0..10).map(|k| (k, index.find(&k))).collect();
    index.insert_all(10..100).unwrap();
    for k in (10..100).step_by(2) {
        assert_eq!(index.remove(&k), Some(k));
    }
    for (k, pos) in refs.iter() {
        assert_eq!(index.get(*pos), Some(k));
    }

    index.clear();
    assert_eq!(index.len(), 0);
    for (_, pos) in refs.iter() {
        assert_eq!(index.get(*pos), None);
    }
    let end = index.end();
    assert_eq!(index.next_pos(end).unwrap(), end);
    index.insert(1).unwrap();
    index.validate().unwrap();
}

#[test]
fn test_rbt_no_memory() {
    let mut config = Config::new("test_rbt_no_memory");
    config.set_node_capacity(3);
    let mut index: Index<u64> = Index::from_config(&config);
    assert_eq!(index.to_name(), "test_rbt_no_memory".to_string());

    index.insert_all(vec![20, 10, 30]).unwrap();
    let height = index.height();
    match index.insert(15) {
        Err(Error::NoMemory(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(index.len(), 3);
    assert_eq!(index.height(), height);
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![10, 20, 30]);
    index.validate().unwrap();

    match index.insert_all(vec![1, 2]) {
        Err(Error::NoMemory(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    index.remove(&20).unwrap();
    index.insert(15).unwrap();
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![10, 15, 30]);

    // copies carry the same bound.
    let mut copy = index.try_clone().unwrap();
    match copy.insert(40) {
        Err(Error::NoMemory(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_rbt_modify() {
    let mut index: Index<u64> = Index::new("test_rbt_modify");
    index.insert_all(vec![10, 20, 30, 40]).unwrap();

    let pos = index.find(&20);
    let npos = index.modify(pos, 35).unwrap();
    assert_eq!(npos, pos);
    assert_eq!(index.get(npos), Some(&35));
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![10, 30, 35, 40]);
    assert_eq!(index.first(), Some(&10));
    index.validate().unwrap();

    let npos = index.modify(index.begin(), 50).unwrap();
    assert_eq!(index.last(), Some(&50));
    assert_eq!(index.first(), Some(&30));
    assert_eq!(index.next_pos(npos).unwrap(), index.end());
    index.validate().unwrap();

    // order equivalent key leaves the entry as is.
    let mut index = new_index("test_rbt_modify");
    let pos = index.insert((20, 1)).unwrap();
    index.insert((10, 2)).unwrap();
    assert_eq!(index.modify(pos, (20, 3)).unwrap(), pos);
    assert_eq!(index.get(pos), Some(&(20, 1)));
    index.validate().unwrap();
}

#[test]
fn test_rbt_duplicates() {
    let mut index = new_index("test_rbt_duplicates");
    let keys = vec![(5, 0), (5, 1), (3, 2), (5, 2), (3, 3), (7, 4)];
    index.insert_all(keys).unwrap();

    let refs = vec![(3, 2), (3, 3), (5, 0), (5, 1), (5, 2), (7, 4)];
    assert_eq!(index.iter().cloned().collect::<Vec<Key>>(), refs);
    assert_eq!(index.len(), 6);
    index.validate().unwrap();

    let mut n = 0;
    while let Some(key) = index.remove(&(5, 0)) {
        assert_eq!(key.0, 5);
        n += 1;
    }
    assert_eq!(n, 3);
    let refs = vec![(3, 2), (3, 3), (7, 4)];
    assert_eq!(index.iter().cloned().collect::<Vec<Key>>(), refs);
    index.validate().unwrap();
}

#[test]
fn test_rbt_round_trip() {
    let seed: u64 = random();
    println!("test_rbt_round_trip seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index = load_index(seed, 1000, 100);
    let refs: Vec<u64> = index.iter().cloned().collect();
    let height = index.height();

    for _ in 0..100 {
        let key = rng.gen::<u64>() % 2000;
        let pos = index.insert(key).unwrap();
        let next = index.erase(pos).unwrap();
        match index.get(next) {
            Some(nkey) => assert!(*nkey >= key),
            None => assert!(next.is_end()),
        }
        assert_eq!(index.len(), refs.len());
    }
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), refs);
    let stats = index.validate().unwrap();
    let limit = 2.0 * ((refs.len() + 1) as f64).log2();
    assert!((stats.height.unwrap() as f64) <= limit, "{} {}", height, stats);
}

#[test]
fn test_rbt_copy() {
    let seed: u64 = random();
    println!("test_rbt_copy seed:{}", seed);

    let mut index = load_index(seed, 1000, 300);
    let copy = index.try_clone().unwrap();
    let other = index.clone();

    let shape = |index: &Index<u64>| {
        let mut keys = vec![];
        if !index.is_empty() {
            index.preorder_from(index.to_root(), |k| keys.push(*k)).unwrap();
        }
        keys
    };
    assert_eq!(shape(&copy), shape(&index));
    assert_eq!(shape(&other), shape(&index));
    assert_eq!(copy.height(), index.height());
    assert_eq!(copy.first(), index.first());
    assert_eq!(copy.last(), index.last());
    copy.validate().unwrap();
    other.validate().unwrap();

    // copies are independent.
    let refs: Vec<u64> = index.iter().cloned().collect();
    index.insert_all(5000..5100).unwrap();
    while let Some(key) = index.first().cloned() {
        if key > 500 {
            break;
        }
        index.remove(&key);
    }
    assert_eq!(copy.iter().cloned().collect::<Vec<u64>>(), refs);
    assert_eq!(other.iter().cloned().collect::<Vec<u64>>(), refs);

    // positions do not cross over to a copy.
    let pos = index.begin();
    assert_eq!(copy.get(pos), None);
}

#[test]
fn test_rbt_take_all() {
    let mut index: Index<u64> = Index::new("test_rbt_take_all");
    index.insert_all(0..100).unwrap();
    let pos = index.find(&50);

    let moved = index.take_all();
    assert_eq!(index.len(), 0);
    assert_eq!(index.iter().next(), None);
    assert_eq!(index.get(pos), None);
    index.validate().unwrap();

    assert_eq!(moved.len(), 100);
    assert_eq!(moved.get(pos), Some(&50));
    assert_eq!(moved.to_name(), index.to_name());
    assert_eq!(moved.iter().cloned().collect::<Vec<u64>>(), (0..100).collect::<Vec<u64>>());
    moved.validate().unwrap();

    index.insert(1).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(moved.len(), 100);
}

#[test]
fn test_rbt_visitors() {
    let mut index: Index<u64> = Index::new("test_rbt_visitors");
    index.insert_all(1..=7).unwrap();
    assert_eq!(index.height(), 3);

    let root = index.to_root();
    let mut keys = vec![];
    index.preorder_from(root, |k| keys.push(*k)).unwrap();
    assert_eq!(keys, vec![2, 1, 4, 3, 6, 5, 7]);

    let mut keys = vec![];
    index.inorder_from(root, |k| keys.push(*k)).unwrap();
    assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 7]);

    let mut keys = vec![];
    index.postorder_from(root, |k| keys.push(*k)).unwrap();
    assert_eq!(keys, vec![1, 3, 5, 7, 6, 4, 2]);

    let pos = index.find(&6);
    let mut keys = vec![];
    index.preorder_from(pos, |k| keys.push(*k)).unwrap();
    assert_eq!(keys, vec![6, 5, 7]);
    let mut keys = vec![];
    index.inorder_from(pos, |k| keys.push(*k)).unwrap();
    assert_eq!(keys, vec![5, 6, 7]);
    let mut keys = vec![];
    index.postorder_from(pos, |k| keys.push(*k)).unwrap();
    assert_eq!(keys, vec![5, 7, 6]);

    let end = index.end();
    assert!(index.inorder_from(end, |_| ()).is_err());
    assert!(index.postorder_from(end, |_| ()).is_err());
}

#[test]
fn test_rbt_reverse() {
    let mut index: Index<u64, Reverse> = Index::with_compare("test_rbt_reverse", Reverse);
    index.insert_all(0..100).unwrap();
    let keys: Vec<u64> = index.iter().cloned().collect();
    assert_eq!(keys, (0..100).rev().collect::<Vec<u64>>());
    assert_eq!(index.first(), Some(&99));
    assert_eq!(index.find(&40).is_end(), false);
    index.validate().unwrap();
}

#[test]
fn test_rbt_collect() {
    let index: Index<u64> = (0..100).rev().collect();
    assert_eq!(index.to_name(), "rbtree".to_string());
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), (0..100).collect::<Vec<u64>>());
    index.validate().unwrap();

    let mut index: Index<u64> = Index::new("test_rbt_collect");
    index.extend(vec![3, 1, 2]);
    index.extend(vec![0]);
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![0, 1, 2, 3]);

    let s = format!("{:?}", index);
    assert!(s.starts_with("test_rbt_collect#"), "{}", s);
    assert!(s.ends_with("[0, 1, 2, 3]"), "{}", s);
}

#[test]
fn test_rbt_stats() {
    let seed: u64 = random();
    println!("test_rbt_stats seed:{}", seed);

    let index = load_index(seed, 10_000, 1000);
    let stats = index.to_stats();
    assert_eq!(stats.name, "testing".to_string());
    assert_eq!(stats.n_count, index.len());
    assert_eq!(stats.n_nodes, index.len());
    assert_eq!(stats.node_size, mem::size_of::<Node<u64>>());
    assert_eq!(stats.height, None);
    assert_eq!(stats.blacks, None);
    assert!(stats.depths.is_none());

    let stats = index.validate().unwrap();
    println!("{}", stats);
    assert_eq!(stats.n_count, index.len());
    assert_eq!(stats.height, Some(index.height()));
    let blacks = stats.blacks.unwrap();
    let height = stats.height.unwrap();
    assert!(blacks >= 1 && blacks <= height + 1, "{} {}", blacks, height);
    let depths = stats.depths.as_ref().unwrap();
    assert_eq!(depths.to_max(), height);
    assert!(depths.to_min() + 1 >= blacks, "{}", depths);
    assert_eq!(depths.to_blacks(), Some((blacks, blacks)));
    assert!(depths.is_balanced(index.len()), "{}", depths);
    assert!(stats.to_string().contains("rbt.name = testing"));
}

#[test]
fn test_rbt_validate_order() {
    let mut index: Index<u64> = Index::new("test_rbt_validate_order");
    index.insert_all(vec![10, 5, 15, 3, 7]).unwrap();
    index.validate().unwrap();

    // grandchild of root, ordered against its parent but not the root.
    let id = index.find(&7).to_node_id().unwrap();
    index.inner.node_mut(id).key = 12;
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![3, 5, 12, 10, 15]);
    match index.validate() {
        Err(Error::Fatal(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    index.inner.node_mut(id).key = 7;
    index.validate().unwrap();

    let id = index.find(&3).to_node_id().unwrap();
    index.inner.node_mut(id).key = 4;
    index.validate().unwrap();
    index.inner.node_mut(id).key = 6;
    match index.validate() {
        Err(Error::Fatal(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    // rotations move equal keys to the left of each other.
    let mut index: Index<u64> = Index::new("test_rbt_validate_order");
    index.insert_all(vec![5; 20]).unwrap();
    let root = index.to_root().to_node_id().unwrap();
    assert!(index.inner.left_of(root).is_some());
    index.validate().unwrap();
}

// arena whose release can be made to fail.
struct LeakyArena {
    arena: Arena<u64>,
    leak: bool,
}

impl Store<u64> for LeakyArena {
    fn alloc(&mut self, node: Node<u64>) -> Result<NodeId> {
        self.arena.alloc(node)
    }

    fn release(&mut self, id: NodeId) -> Result<Node<u64>> {
        match self.leak {
            true => err_at!(InvalidInput, msg: "release refused {:?}", id),
            false => self.arena.release(id),
        }
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.arena.is_live(id)
    }

    fn as_node(&self, id: NodeId) -> &Node<u64> {
        self.arena.as_node(id)
    }

    fn as_mut_node(&mut self, id: NodeId) -> &mut Node<u64> {
        self.arena.as_mut_node(id)
    }

    fn to_empty(&self) -> LeakyArena {
        LeakyArena {
            arena: self.arena.to_empty(),
            leak: self.leak,
        }
    }

    fn clear(&mut self) {
        self.arena.clear()
    }

    fn len(&self) -> usize {
        self.arena.len()
    }
}

#[test]
fn test_rbt_release_failure() {
    let store = LeakyArena {
        arena: Arena::new(),
        leak: false,
    };
    let mut index = Index::with_store("test_rbt_release_failure", Natural, store);
    index.insert_all(vec![10, 20, 30, 40]).unwrap();
    index.inner.store.leak = true;

    // entry is detached and counted out, failure is reported.
    let pos = index.find(&20);
    match index.take(pos) {
        Err(Error::Fatal(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(index.len(), 3);
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![10, 30, 40]);

    assert_eq!(index.remove(&30), None);
    assert_eq!(index.len(), 2);
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![10, 40]);
    assert_eq!(index.first(), Some(&10));
    assert_eq!(index.last(), Some(&40));

    // store still holds the leaked nodes.
    match index.validate() {
        Err(Error::Fatal(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    index.inner.store.leak = false;
    assert_eq!(index.remove(&40), Some(40));
    assert_eq!(index.iter().cloned().collect::<Vec<u64>>(), vec![10]);
}
