pub const ULTRA_WIDE_CLAUSE: &str = "CAMERA STYLE: Ultra-wide angle 0.6x lens, dynamic Gen-Z perspective, distorted edges, high-angle look down or extreme close-up, wide field of view.";
pub const Y2K_PHONE_CLAUSE: &str = "CAMERA STYLE: 2000s mobile phone camera (Nokia style), low resolution digital artifacts, heavy digital noise, slight motion blur, pixelated texture, raw Y2K aesthetic.";
pub const VINTAGE_DIGICAM_CLAUSE: &str = "CAMERA STYLE: Early 2010s point-and-shoot digital camera, chromatic aberration, sensor blooming, characteristic digicam color science, slightly soft edges.";
pub const NOSTALGIC_GLOW_CLAUSE: &str = "LIGHTING: Dreamy nostalgic glow, high-key soft lighting, ethereal bloom, warm childhood memory vibe, slightly hazy, saturated primary colors, vintage film look.";
pub const OVEREXPOSED_FLASH_CLAUSE: &str = "LIGHTING: Overexposed harsh direct flash, red-eye effect simulation, hard shadows, party photography look from the early 2000s, high contrast, washed out skin tones.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Influencer,
    Website,
}

impl Mode {
    pub fn id(self) -> &'static str {
        match self {
            Mode::Influencer => "influencer",
            Mode::Website => "website",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        match value {
            "influencer" => Some(Mode::Influencer),
            "website" => Some(Mode::Website),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Influencer => "Influencer Photo",
            Mode::Website => "Website Build",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    Natural,
    Balanced,
    HighFidelity,
    HyperReal,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 4] = [
        DetailLevel::Natural,
        DetailLevel::Balanced,
        DetailLevel::HighFidelity,
        DetailLevel::HyperReal,
    ];

    pub const DEFAULT: DetailLevel = DetailLevel::HighFidelity;

    pub fn level(self) -> u8 {
        match self {
            DetailLevel::Natural => 1,
            DetailLevel::Balanced => 2,
            DetailLevel::HighFidelity => 3,
            DetailLevel::HyperReal => 4,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(DetailLevel::Natural),
            2 => Some(DetailLevel::Balanced),
            3 => Some(DetailLevel::HighFidelity),
            4 => Some(DetailLevel::HyperReal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailLevel::Natural => "Natural",
            DetailLevel::Balanced => "Balanced",
            DetailLevel::HighFidelity => "High Fidelity",
            DetailLevel::HyperReal => "Hyper-Real",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            DetailLevel::Natural => "Simple realism. Natural look.",
            DetailLevel::Balanced => "Balanced realism with camera details.",
            DetailLevel::HighFidelity => {
                "High fidelity realism. Focus on visible skin pores, skin texture, and fabric details."
            }
            DetailLevel::HyperReal => {
                "EXTREME HYPER-REALISM. MUST describe microscopic details: 'visible pores', 'vellus hair' (peach fuzz), 'flyaway hairs', 'skin texture imperfections', 'slight wrinkles', 'raw photo look'."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraStyle {
    Auto,
    UltraWide,
    Y2kPhone,
    VintageDigicam,
    PhoneSelfie,
    MirrorSelfie,
    PortraitPrime,
    StreetFilm,
    StudioFashion,
    Cctv,
    InstantFilm,
    ActionFisheye,
    Webcam,
}

impl CameraStyle {
    pub const ALL: [CameraStyle; 13] = [
        CameraStyle::Auto,
        CameraStyle::UltraWide,
        CameraStyle::Y2kPhone,
        CameraStyle::VintageDigicam,
        CameraStyle::PhoneSelfie,
        CameraStyle::MirrorSelfie,
        CameraStyle::PortraitPrime,
        CameraStyle::StreetFilm,
        CameraStyle::StudioFashion,
        CameraStyle::Cctv,
        CameraStyle::InstantFilm,
        CameraStyle::ActionFisheye,
        CameraStyle::Webcam,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CameraStyle::Auto => "auto",
            CameraStyle::UltraWide => "ultra_wide",
            CameraStyle::Y2kPhone => "y2k_phone",
            CameraStyle::VintageDigicam => "vintage_digicam",
            CameraStyle::PhoneSelfie => "phone_selfie",
            CameraStyle::MirrorSelfie => "mirror_selfie",
            CameraStyle::PortraitPrime => "portrait_prime",
            CameraStyle::StreetFilm => "street_film",
            CameraStyle::StudioFashion => "studio_fashion",
            CameraStyle::Cctv => "cctv",
            CameraStyle::InstantFilm => "instant_film",
            CameraStyle::ActionFisheye => "action_fisheye",
            CameraStyle::Webcam => "webcam",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        CameraStyle::ALL.into_iter().find(|style| style.id() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraStyle::Auto => "Auto (Let AI Decide)",
            CameraStyle::UltraWide => "Ultra Wide (0.6x Selfie)",
            CameraStyle::Y2kPhone => "2000s Phone Cam (Y2K)",
            CameraStyle::VintageDigicam => "Vintage Digicam (2010s)",
            CameraStyle::PhoneSelfie => "iPhone 15 Pro Max (Selfie)",
            CameraStyle::MirrorSelfie => "Mirror Selfie (Phone Visible)",
            CameraStyle::PortraitPrime => "Sony A7R IV (85mm Portrait)",
            CameraStyle::StreetFilm => "Fujifilm X100V (Street/Film)",
            CameraStyle::StudioFashion => "Canon EOS R5 (Fashion/Studio)",
            CameraStyle::Cctv => "CCTV / Security Cam (Grainy)",
            CameraStyle::InstantFilm => "Polaroid / Instax (Flash)",
            CameraStyle::ActionFisheye => "GoPro (Fisheye/Action)",
            CameraStyle::Webcam => "Webcam (Low Quality/Natural)",
        }
    }

    pub fn constraint(self) -> Option<String> {
        match self {
            CameraStyle::Auto => None,
            CameraStyle::UltraWide => Some(ULTRA_WIDE_CLAUSE.to_string()),
            CameraStyle::Y2kPhone => Some(Y2K_PHONE_CLAUSE.to_string()),
            CameraStyle::VintageDigicam => Some(VINTAGE_DIGICAM_CLAUSE.to_string()),
            _ => Some(format!(
                "CAMERA: Simulate exact technical specs of \"{}\".",
                self.label()
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightingStyle {
    Auto,
    NostalgicGlow,
    OverexposedFlash,
    WindowLight,
    GoldenHour,
    RingLight,
    MoodyBedroom,
    HarshNoon,
    NeonStreet,
    StudioSoftbox,
}

impl LightingStyle {
    pub const ALL: [LightingStyle; 10] = [
        LightingStyle::Auto,
        LightingStyle::NostalgicGlow,
        LightingStyle::OverexposedFlash,
        LightingStyle::WindowLight,
        LightingStyle::GoldenHour,
        LightingStyle::RingLight,
        LightingStyle::MoodyBedroom,
        LightingStyle::HarshNoon,
        LightingStyle::NeonStreet,
        LightingStyle::StudioSoftbox,
    ];

    pub fn id(self) -> &'static str {
        match self {
            LightingStyle::Auto => "auto",
            LightingStyle::NostalgicGlow => "nostalgic_glow",
            LightingStyle::OverexposedFlash => "overexposed_flash",
            LightingStyle::WindowLight => "window_light",
            LightingStyle::GoldenHour => "golden_hour",
            LightingStyle::RingLight => "ring_light",
            LightingStyle::MoodyBedroom => "moody_bedroom",
            LightingStyle::HarshNoon => "harsh_noon",
            LightingStyle::NeonStreet => "neon_street",
            LightingStyle::StudioSoftbox => "studio_softbox",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        LightingStyle::ALL.into_iter().find(|style| style.id() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            LightingStyle::Auto => "Auto (Let AI Decide)",
            LightingStyle::NostalgicGlow => "Nostalgic Glow (Dreamy)",
            LightingStyle::OverexposedFlash => "Overexposed Flash (Party)",
            LightingStyle::WindowLight => "Natural Window Light",
            LightingStyle::GoldenHour => "Golden Hour (Sunset)",
            LightingStyle::RingLight => "Ring Light (Streamer)",
            LightingStyle::MoodyBedroom => "Dim Bedroom (Moody)",
            LightingStyle::HarshNoon => "Midday Sun (Hard Shadows)",
            LightingStyle::NeonStreet => "Neon Street (Night)",
            LightingStyle::StudioSoftbox => "Softbox (Studio)",
        }
    }

    pub fn constraint(self) -> Option<String> {
        match self {
            LightingStyle::Auto => None,
            LightingStyle::NostalgicGlow => Some(NOSTALGIC_GLOW_CLAUSE.to_string()),
            LightingStyle::OverexposedFlash => Some(OVEREXPOSED_FLASH_CLAUSE.to_string()),
            _ => Some(format!("LIGHTING: Use \"{}\".", self.label())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteType {
    Landing,
    Saas,
    Portfolio,
    Ecommerce,
    Blog,
    Dashboard,
}

impl SiteType {
    pub const ALL: [SiteType; 6] = [
        SiteType::Landing,
        SiteType::Saas,
        SiteType::Portfolio,
        SiteType::Ecommerce,
        SiteType::Blog,
        SiteType::Dashboard,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SiteType::Landing => "landing",
            SiteType::Saas => "saas",
            SiteType::Portfolio => "portfolio",
            SiteType::Ecommerce => "ecommerce",
            SiteType::Blog => "blog",
            SiteType::Dashboard => "dashboard",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        SiteType::ALL.into_iter().find(|site| site.id() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            SiteType::Landing => "Landing Page",
            SiteType::Saas => "SaaS Product",
            SiteType::Portfolio => "Portfolio",
            SiteType::Ecommerce => "E-commerce Store",
            SiteType::Blog => "Blog / Magazine",
            SiteType::Dashboard => "Dashboard / Admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesignStyle {
    Minimal,
    Bento,
    Glassmorphism,
    Brutalist,
    DarkSaas,
    Playful,
}

impl DesignStyle {
    pub const ALL: [DesignStyle; 6] = [
        DesignStyle::Minimal,
        DesignStyle::Bento,
        DesignStyle::Glassmorphism,
        DesignStyle::Brutalist,
        DesignStyle::DarkSaas,
        DesignStyle::Playful,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DesignStyle::Minimal => "minimal",
            DesignStyle::Bento => "bento",
            DesignStyle::Glassmorphism => "glassmorphism",
            DesignStyle::Brutalist => "brutalist",
            DesignStyle::DarkSaas => "dark_saas",
            DesignStyle::Playful => "playful",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        DesignStyle::ALL.into_iter().find(|style| style.id() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            DesignStyle::Minimal => "Minimal & Clean",
            DesignStyle::Bento => "Bento Grid",
            DesignStyle::Glassmorphism => "Glassmorphism",
            DesignStyle::Brutalist => "Brutalist",
            DesignStyle::DarkSaas => "Dark Mode SaaS",
            DesignStyle::Playful => "Playful & Colorful",
        }
    }
}
