use seqnet::{
    load_model, save_model, ActivationFunction, Buffer, Init, MseLoss, NodeSpec, SequenceSpec, Sgd,
};

fn main() -> seqnet::Result<()> {
    env_logger::init();

    let spec = SequenceSpec {
        name: "xor".to_string(),
        training: true,
        nodes: vec![
            NodeSpec::Dense { inputs: 2, outputs: 4, init: Init::Xavier },
            NodeSpec::Activation { function: ActivationFunction::Tanh },
            NodeSpec::Dense { inputs: 4, outputs: 1, init: Init::Xavier },
            NodeSpec::Activation { function: ActivationFunction::Sigmoid },
        ],
    };
    let mut network = spec.build()?;

    let inputs: Vec<Buffer> = [[1.0_f32, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
        .iter()
        .map(|x| Buffer::from_slice(x))
        .collect();
    let expected_outputs: Vec<Buffer> = [1.0_f32, 0.0, 1.0, 0.0]
        .iter()
        .map(|&y| Buffer::from_vec(vec![y]))
        .collect();

    let optimizer = Sgd::new(0.5);
    let epochs = 5000;

    for epoch in 0..epochs {
        let mut loss = 0.0;
        for (input, expected) in inputs.iter().zip(expected_outputs.iter()) {
            let output = network.forward(input).clone();
            loss += MseLoss::loss(&output, expected);
            network.backward(input, &MseLoss::derivative(&output, expected));
            optimizer.step(&mut network);
        }
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {:.6}", loss / inputs.len() as f32);
        }
    }

    let path = std::env::temp_dir().join(format!("{}.nnmd", spec.name));
    save_model(&network, &path)?;

    let mut restored = spec.build()?;
    load_model(&mut restored, &path)?;
    restored.set_training(false);

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input.as_slice(), restored.forward(input)[0]);
    }
    Ok(())
}
