// ============================================================
// Layer 5 - Convolutional Autoencoder
// ============================================================
// Encoder: 3x3 conv -> ReLU, three times, all same-padded, so the
// feature map stays 28x28. Flattened and projected to the latent
// vector with no activation.
//
// Decoder: latent -> 14*14*channels -> 784, ReLU after both dense
// layers, reshaped back to [batch, 1, 28, 28].
//
// Dense weights use Xavier normal init; loss is pixel-wise MSE.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        Initializer, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

#[derive(Config, Debug)]
pub struct AutoencoderConfig {
    /// Side length of the square input images
    #[config(default = 28)]
    pub image_size:  usize,
    /// Filters in each of the three convolution stages
    #[config(default = 128)]
    pub channels:    usize,
    /// Width of the bottleneck vector
    #[config(default = 20)]
    pub latent_size: usize,
}

impl AutoencoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Autoencoder<B> {
        let pixels  = self.image_size * self.image_size;
        let half    = self.image_size / 2;
        let hidden  = half * half * self.channels;
        let xavier  = Initializer::XavierNormal { gain: 1.0 };

        let conv = |c_in: usize, c_out: usize| -> Conv2d<B> {
            Conv2dConfig::new([c_in, c_out], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device)
        };
        let dense = |d_in: usize, d_out: usize| -> Linear<B> {
            LinearConfig::new(d_in, d_out)
                .with_initializer(xavier.clone())
                .init(device)
        };

        Autoencoder {
            conv1: conv(1, self.channels),
            conv2: conv(self.channels, self.channels),
            conv3: conv(self.channels, self.channels),
            flat_to_latent:    dense(self.channels * pixels, self.latent_size),
            latent_to_decoder: dense(self.latent_size, hidden),
            decoder_1_to_2:    dense(hidden, pixels),
            image_size: self.image_size,
        }
    }
}

/// Three same-padded conv stages, a dense bottleneck, and a dense
/// decoder back to image space.
#[derive(Module, Debug)]
pub struct Autoencoder<B: Backend> {
    pub conv1:             Conv2d<B>,
    pub conv2:             Conv2d<B>,
    pub conv3:             Conv2d<B>,
    pub flat_to_latent:    Linear<B>,
    pub latent_to_decoder: Linear<B>,
    pub decoder_1_to_2:    Linear<B>,
    pub image_size:        usize,
}

impl<B: Backend> Autoencoder<B> {
    /// images: [batch, 1, H, W] → latent: [batch, latent_size]
    pub fn encode(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(images));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));
        let x: Tensor<B, 2> = x.flatten(1, 3); // [batch, channels * H * W]
        self.flat_to_latent.forward(x)
    }

    /// latent: [batch, latent_size] → images: [batch, 1, H, W]
    pub fn decode(&self, latent: Tensor<B, 2>) -> Tensor<B, 4> {
        let [batch_size, _] = latent.dims();
        let x = relu(self.latent_to_decoder.forward(latent));
        let x = relu(self.decoder_1_to_2.forward(x));
        x.reshape([batch_size, 1, self.image_size, self.image_size])
    }

    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decode(self.encode(images))
    }

    /// Mean squared pixel error between input and reconstruction.
    pub fn forward_loss(&self, images: Tensor<B, 4>) -> (Tensor<B, 1>, Tensor<B, 4>) {
        let reconstruction = self.forward(images.clone());
        let loss = MseLoss::new().forward(reconstruction.clone(), images, Reduction::Mean);
        (loss, reconstruction)
    }
}
