use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use seqnet::{Activation, Buffer, Dense, Node, Sequence};

fn two_node_sequence() -> Sequence {
    // W = [[0.1, 0.2], [0.3, 0.4]] (rows are outputs), b = [0.5, -0.5]
    Sequence::new()
        .with(Dense::from_parts(
            2,
            2,
            Buffer::from_vec(vec![0.1, 0.2, 0.3, 0.4]),
            Buffer::from_vec(vec![0.5, -0.5]),
        ))
        .with(Activation::sigmoid())
}

#[test]
fn dense_sigmoid_gradients_match_hand_computation() {
    let mut seq = two_node_sequence();
    seq.set_training(true);
    let x = Buffer::from_vec(vec![1.0, 2.0]);
    let dy = Buffer::from_vec(vec![1.0, -1.0]);

    // z = [1.0, 0.6]
    let y = seq.forward(&x).clone();
    assert_abs_diff_eq!(y[0], 0.731_058_6, epsilon = 1e-5);
    assert_abs_diff_eq!(y[1], 0.645_656_3, epsilon = 1e-5);

    // dz = dy ⊙ y(1 - y) = [0.196612, -0.228784]
    let dx = seq.backward(&x, &dy);
    assert_abs_diff_eq!(dx[0], -0.048_974_08, epsilon = 1e-5);
    assert_abs_diff_eq!(dx[1], -0.052_191_31, epsilon = 1e-5);

    let dense = seq.parameterised()[0];
    let dw = dense.get_w().grad.as_slice();
    let expected_dw = [0.196_611_9, 0.393_223_9, -0.228_784_2, -0.457_568_5];
    for (g, e) in dw.iter().zip(expected_dw.iter()) {
        assert_abs_diff_eq!(*g, *e, epsilon = 1e-5);
    }
    let db = dense.get_b().grad.as_slice();
    assert_abs_diff_eq!(db[0], 0.196_611_9, epsilon = 1e-5);
    assert_abs_diff_eq!(db[1], -0.228_784_2, epsilon = 1e-5);
}

#[test]
fn output_length_matches_last_node() {
    let mut seq = Sequence::new()
        .with(Dense::new(5, 3))
        .with(Activation::tanh())
        .with(Dense::new(3, 7))
        .with(Activation::softmax());
    let y = seq.forward(&Buffer::from_vec(vec![0.3; 5]));
    assert_eq!(y.size(), 7);
    assert_eq!(seq.activations().len(), seq.len() + 1);
}

#[test]
fn backward_feeds_each_node_its_forward_input() {
    // Records the input each recorder receives in backward.
    struct Recorder {
        offset: f32,
        seen: Rc<RefCell<Vec<(f32, Buffer)>>>,
    }

    impl Node for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn forward(&mut self, x: &Buffer) -> Buffer {
            Buffer::from_vec(x.iter().map(|v| v + self.offset).collect())
        }

        fn backward(&mut self, x: &Buffer, dy: &Buffer) -> Buffer {
            self.seen.borrow_mut().push((self.offset, x.clone()));
            dy.clone()
        }
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut seq = Sequence::new()
        .with(Recorder { offset: 1.0, seen: seen.clone() })
        .with(Recorder { offset: 10.0, seen: seen.clone() })
        .with(Activation::relu());
    let x = Buffer::from_vec(vec![-13.0, 4.0]);
    seq.forward(&x);
    let dx = seq.backward(&x, &Buffer::from_vec(vec![1.0, 1.0]));

    // relu saw [-2, 15] and blocks the first element
    assert_eq!(dx.as_slice(), &[0.0, 1.0]);

    // reverse order, each with the input it saw going forward
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, 10.0);
    assert_eq!(seen[0].1.as_slice(), &[-12.0, 5.0]);
    assert_eq!(seen[1].0, 1.0);
    assert_eq!(seen[1].1, x);
}

#[test]
fn softmax_head_gradient_sums_to_zero() {
    let mut seq = Sequence::new()
        .with(Dense::from_parts(
            3,
            3,
            Buffer::from_vec(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
            Buffer::zeros(3),
        ))
        .with(Activation::softmax());
    let x = Buffer::from_vec(vec![0.5, 1.5, -0.5]);
    let y = seq.forward(&x).clone();
    assert_abs_diff_eq!(y.iter().sum::<f32>(), 1.0, epsilon = 1e-6);

    // identity weights: dx equals the softmax input gradient, which sums to zero
    let dx = seq.backward(&x, &Buffer::from_vec(vec![0.2, -0.7, 0.4]));
    assert_abs_diff_eq!(dx.iter().sum::<f32>(), 0.0, epsilon = 1e-6);
}
